//! Single-line text renderings of an overlap record.

use std::fmt;

use crate::layout::OverlapLayout;
use crate::record::OverlapRecord;

/// How to render a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OverlapDisplay {
    /// Ids, orientation, signed hangs and percent error.
    #[default]
    Hangs,
    /// Ids, orientation, alignment coordinates on both reads and percent error.
    Coords,
    /// Every stored field.
    Raw,
    /// The twelve mandatory PAF columns.
    Paf,
}

impl OverlapDisplay {
    /// Whether this style needs both read lengths.
    #[must_use]
    pub fn needs_lengths(self) -> bool {
        matches!(self, Self::Coords | Self::Paf)
    }
}

/// A record paired with a style, implementing [`fmt::Display`].
///
/// ```
/// use ovlpipe_record::{DisplayOverlap, Medium, OverlapDisplay, OverlapRecord};
///
/// let mut record = OverlapRecord::<Medium>::new(3, 9);
/// record.set_a_hang(120).unwrap();
/// record.set_b_hang(-40).unwrap();
/// let line = DisplayOverlap::new(&record, OverlapDisplay::Hangs, None).unwrap().to_string();
/// assert!(line.contains("120"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DisplayOverlap<'a, L: OverlapLayout> {
    record: &'a OverlapRecord<L>,
    style: OverlapDisplay,
    lengths: (u32, u32),
}

impl<'a, L: OverlapLayout> DisplayOverlap<'a, L> {
    /// Wrap `record`. `lengths` are the lengths of reads A and B.
    ///
    /// Returns `None` when `style` needs read lengths and none were given.
    #[must_use]
    pub fn new(record: &'a OverlapRecord<L>, style: OverlapDisplay, lengths: Option<(u32, u32)>) -> Option<Self> {
        match lengths {
            Some(lengths) => Some(Self { record, style, lengths }),
            None if style.needs_lengths() => None,
            None => Some(Self { record, style, lengths: (0, 0) }),
        }
    }
}

fn orient(flipped: bool) -> char {
    if flipped { 'I' } else { 'N' }
}

fn flag(set: bool, c: char) -> char {
    if set { c } else { '-' }
}

impl<L: OverlapLayout> fmt::Display for DisplayOverlap<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.record;
        let (a_len, b_len) = self.lengths;
        let percent = r.erate() * 100.0;
        match self.style {
            OverlapDisplay::Hangs => write!(
                f,
                "{:>10} {:>10}  {}  {:>6} {:>6}  {:>6.2}",
                r.a_id(),
                r.b_id(),
                orient(r.flipped()),
                r.a_hang(),
                r.b_hang(),
                percent
            ),
            OverlapDisplay::Coords => write!(
                f,
                "{:>10} {:>10}  {}  {:>6} {:>6} {:>6}  {:>6} {:>6} {:>6}  {:>6.2}",
                r.a_id(),
                r.b_id(),
                orient(r.flipped()),
                r.a_bgn(),
                r.a_end(a_len),
                a_len,
                r.b_bgn(b_len),
                r.b_end(b_len),
                b_len,
                percent
            ),
            OverlapDisplay::Raw => write!(
                f,
                "{:>10} {:>10}  {}  {:>6} {:>6} {:>6} {:>6}  {:>6}  {:>4}  {}{}{}",
                r.a_id(),
                r.b_id(),
                orient(r.flipped()),
                r.ahg5(),
                r.ahg3(),
                r.bhg5(),
                r.bhg3(),
                r.span(),
                r.evalue(),
                flag(r.for_trim(), 't'),
                flag(r.for_dedup(), 'd'),
                flag(r.for_graph(), 'g')
            ),
            OverlapDisplay::Paf => {
                let (b_bgn, b_end) = (r.b_bgn(b_len), r.b_end(b_len));
                let (t_start, t_end) = if b_bgn <= b_end { (b_bgn, b_end) } else { (b_end, b_bgn) };
                let block = if r.span() > 0 { r.span() } else { r.a_aligned_len(a_len).max(r.b_aligned_len(b_len)) };
                let matches = (r.identity() * f64::from(block)).floor() as u32;
                write!(
                    f,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t255",
                    r.a_id(),
                    a_len,
                    r.a_bgn(),
                    r.a_end(a_len),
                    if r.flipped() { '-' } else { '+' },
                    r.b_id(),
                    b_len,
                    t_start,
                    t_end,
                    matches,
                    block
                )
            }
        }
    }
}
