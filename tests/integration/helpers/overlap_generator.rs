//! Seeded generation of raw overlaps.

#![allow(dead_code)]

use ovlpipe_lib::lookup::ReadLengths;
use ovlpipe_lib::source::RawOverlap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` overlaps whose `a_id` equals their input position.
///
/// Hangs are drawn below `max_hang` and the span below `2 * max_hang`, so a
/// `max_hang` above the profile bound produces some out-of-range overlaps.
pub fn random_overlaps(n: usize, seed: u64, max_hang: u32) -> Vec<RawOverlap> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let dovetail_left = rng.random_bool(0.5);
            let (ahg5, bhg3) = if dovetail_left { (rng.random_range(0..max_hang), 0) } else { (0, rng.random_range(0..max_hang)) };
            let (ahg3, bhg5) = if dovetail_left { (0, rng.random_range(0..max_hang)) } else { (rng.random_range(0..max_hang), 0) };
            RawOverlap {
                a_id: i as u32,
                b_id: rng.random_range(0..n as u32 + 1),
                ahg5,
                ahg3,
                bhg5,
                bhg3,
                span: rng.random_range(0..2 * max_hang),
                erate: rng.random_range(0.0..0.2),
                flipped: rng.random_bool(0.3),
            }
        })
        .collect()
}

/// `n` small, always-encodable overlaps in input order.
pub fn sequential_overlaps(n: usize) -> Vec<RawOverlap> {
    (0..n)
        .map(|i| RawOverlap {
            a_id: i as u32,
            b_id: i as u32 + 1,
            ahg5: (i % 100) as u32,
            bhg3: 10,
            erate: 0.01,
            ..RawOverlap::default()
        })
        .collect()
}

/// A length of `len` for every read id referenced by `overlaps`.
pub fn uniform_lengths(overlaps: &[RawOverlap], len: u32) -> ReadLengths {
    overlaps.iter().flat_map(|o| [(o.a_id, len), (o.b_id, len)]).collect()
}
