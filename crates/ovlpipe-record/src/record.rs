//! Packed pairwise overlap records and the profile-checked codec.
//!
//! An [`OverlapRecord`] stores the two read ids unpacked and everything else in
//! the word array of its [`OverlapLayout`]. Setters only reject values that do
//! not fit the storage slot; the tighter profile bound (`2^W - 1`) is enforced by
//! [`OverlapCodec`].

use std::fmt;
use std::marker::PhantomData;

use crate::error::{ProfileError, RangeError};
use crate::evalue::{MAX_EVALUE, decode_evalue, encode_evalue};
use crate::layout::{FieldSpec, OverlapLayout, PackedWords, get_field, set_field};
use crate::profile::Profile;

/// Scale applied to identity when scoring an overlap.
const SCORE_SCALE: f64 = 16_384.0;

/// The logical fields of an overlap, independent of any layout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlapFields {
    /// Id of read A.
    pub a_id: u32,
    /// Id of read B.
    pub b_id: u32,
    /// Bases of A before the alignment.
    pub ahg5: u32,
    /// Bases of A after the alignment.
    pub ahg3: u32,
    /// Bases of B before the alignment.
    pub bhg5: u32,
    /// Bases of B after the alignment.
    pub bhg3: u32,
    /// Alignment length; zero when unknown.
    pub span: u32,
    /// Error fraction of the alignment.
    pub erate: f64,
    /// B is reverse-complemented relative to A.
    pub flipped: bool,
    /// Usable for overlap-based trimming.
    pub for_trim: bool,
    /// Usable for duplicate detection.
    pub for_dedup: bool,
    /// Usable for graph construction.
    pub for_graph: bool,
}

/// One packed overlap between read A and read B.
///
/// Records order by `a_id`, then `b_id`, then the packed payload words.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlapRecord<L: OverlapLayout> {
    a_id: u32,
    b_id: u32,
    dat: L::Words,
}

impl<L: OverlapLayout> Default for OverlapRecord<L> {
    fn default() -> Self {
        Self { a_id: 0, b_id: 0, dat: L::Words::default() }
    }
}

impl<L: OverlapLayout> OverlapRecord<L> {
    /// Bytes in the little-endian payload produced by [`Self::to_le_bytes`].
    pub const PAYLOAD_BYTES: usize = <L::Words as PackedWords>::NUM_BYTES;

    /// A record between `a_id` and `b_id` with every payload field zero.
    #[must_use]
    pub fn new(a_id: u32, b_id: u32) -> Self {
        Self { a_id, b_id, dat: L::Words::default() }
    }

    fn get(&self, spec: FieldSpec) -> u64 {
        get_field(&self.dat, spec)
    }

    fn set_checked(&mut self, field: &'static str, spec: FieldSpec, value: u64) -> Result<(), RangeError> {
        Self::check_slot(field, spec, value)?;
        set_field(&mut self.dat, spec, value);
        Ok(())
    }

    fn set_flag(&mut self, spec: FieldSpec, value: bool) {
        set_field(&mut self.dat, spec, u64::from(value));
    }

    // Slot widths never exceed 32 bits, so every integer field fits in a u32.
    fn get_u32(&self, spec: FieldSpec) -> u32 {
        self.get(spec) as u32
    }

    /// Id of read A.
    #[inline]
    #[must_use]
    pub fn a_id(&self) -> u32 {
        self.a_id
    }

    /// Id of read B.
    #[inline]
    #[must_use]
    pub fn b_id(&self) -> u32 {
        self.b_id
    }

    /// Set the id of read A.
    pub fn set_a_id(&mut self, id: u32) {
        self.a_id = id;
    }

    /// Set the id of read B.
    pub fn set_b_id(&mut self, id: u32) {
        self.b_id = id;
    }

    /// Bases of A before the alignment.
    #[inline]
    #[must_use]
    pub fn ahg5(&self) -> u32 {
        self.get_u32(L::AHG5)
    }

    /// Bases of A after the alignment.
    #[inline]
    #[must_use]
    pub fn ahg3(&self) -> u32 {
        self.get_u32(L::AHG3)
    }

    /// Bases of B before the alignment.
    #[inline]
    #[must_use]
    pub fn bhg5(&self) -> u32 {
        self.get_u32(L::BHG5)
    }

    /// Bases of B after the alignment.
    #[inline]
    #[must_use]
    pub fn bhg3(&self) -> u32 {
        self.get_u32(L::BHG3)
    }

    /// Alignment length, zero when unknown.
    #[inline]
    #[must_use]
    pub fn span(&self) -> u32 {
        self.get_u32(L::SPAN)
    }

    /// # Errors
    ///
    /// Returns [`RangeError::FieldTooLarge`] if `value` does not fit the layout's slot.
    pub fn set_ahg5(&mut self, value: u32) -> Result<(), RangeError> {
        self.set_checked("ahg5", L::AHG5, u64::from(value))
    }

    /// # Errors
    ///
    /// Returns [`RangeError::FieldTooLarge`] if `value` does not fit the layout's slot.
    pub fn set_ahg3(&mut self, value: u32) -> Result<(), RangeError> {
        self.set_checked("ahg3", L::AHG3, u64::from(value))
    }

    /// # Errors
    ///
    /// Returns [`RangeError::FieldTooLarge`] if `value` does not fit the layout's slot.
    pub fn set_bhg5(&mut self, value: u32) -> Result<(), RangeError> {
        self.set_checked("bhg5", L::BHG5, u64::from(value))
    }

    /// # Errors
    ///
    /// Returns [`RangeError::FieldTooLarge`] if `value` does not fit the layout's slot.
    pub fn set_bhg3(&mut self, value: u32) -> Result<(), RangeError> {
        self.set_checked("bhg3", L::BHG3, u64::from(value))
    }

    /// # Errors
    ///
    /// Returns [`RangeError::FieldTooLarge`] if `value` does not fit the layout's slot.
    pub fn set_span(&mut self, value: u32) -> Result<(), RangeError> {
        self.set_checked("span", L::SPAN, u64::from(value))
    }

    /// The raw 12-bit error code.
    #[inline]
    #[must_use]
    pub fn evalue(&self) -> u16 {
        self.get(L::EVALUE) as u16
    }

    /// Store a raw error code.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::FieldTooLarge`] for codes above [`MAX_EVALUE`].
    pub fn set_evalue(&mut self, evalue: u16) -> Result<(), RangeError> {
        if evalue > MAX_EVALUE {
            return Err(RangeError::FieldTooLarge {
                field: "evalue",
                value: u64::from(evalue),
                max: u64::from(MAX_EVALUE),
            });
        }
        set_field(&mut self.dat, L::EVALUE, u64::from(evalue));
        Ok(())
    }

    /// Error fraction of the alignment.
    #[inline]
    #[must_use]
    pub fn erate(&self) -> f64 {
        decode_evalue(self.evalue())
    }

    /// Quantize and store an error fraction, saturating at [`crate::MAX_ERATE`].
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::InvalidErrorRate`] for negative or NaN fractions.
    pub fn set_erate(&mut self, erate: f64) -> Result<(), RangeError> {
        let evalue = encode_evalue(erate)?;
        set_field(&mut self.dat, L::EVALUE, u64::from(evalue));
        Ok(())
    }

    /// `1 - erate`.
    #[inline]
    #[must_use]
    pub fn identity(&self) -> f64 {
        1.0 - self.erate()
    }

    /// B is reverse-complemented relative to A.
    #[inline]
    #[must_use]
    pub fn flipped(&self) -> bool {
        self.get(L::FLIPPED) != 0
    }

    /// Usable for overlap-based trimming.
    #[inline]
    #[must_use]
    pub fn for_trim(&self) -> bool {
        self.get(L::FOR_TRIM) != 0
    }

    /// Usable for duplicate detection.
    #[inline]
    #[must_use]
    pub fn for_dedup(&self) -> bool {
        self.get(L::FOR_DEDUP) != 0
    }

    /// Usable for graph construction.
    #[inline]
    #[must_use]
    pub fn for_graph(&self) -> bool {
        self.get(L::FOR_GRAPH) != 0
    }

    /// Set the orientation flag.
    pub fn set_flipped(&mut self, value: bool) {
        self.set_flag(L::FLIPPED, value);
    }

    /// Set the trimming tag.
    pub fn set_for_trim(&mut self, value: bool) {
        self.set_flag(L::FOR_TRIM, value);
    }

    /// Set the deduplication tag.
    pub fn set_for_dedup(&mut self, value: bool) {
        self.set_flag(L::FOR_DEDUP, value);
    }

    /// Set the graph construction tag.
    pub fn set_for_graph(&mut self, value: bool) {
        self.set_flag(L::FOR_GRAPH, value);
    }

    /// `ahg5 - bhg5`.
    #[inline]
    #[must_use]
    pub fn a_hang(&self) -> i64 {
        i64::from(self.ahg5()) - i64::from(self.bhg5())
    }

    /// `bhg3 - ahg3`.
    #[inline]
    #[must_use]
    pub fn b_hang(&self) -> i64 {
        i64::from(self.bhg3()) - i64::from(self.ahg3())
    }

    /// Set the 5' hangs from a signed A hang: positive puts it on A, negative on B.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::FieldTooLarge`] if the magnitude does not fit the slot.
    pub fn set_a_hang(&mut self, a_hang: i64) -> Result<(), RangeError> {
        let (ahg5, bhg5) = if a_hang < 0 { (0, a_hang.unsigned_abs()) } else { (a_hang.unsigned_abs(), 0) };
        Self::check_slot("ahg5", L::AHG5, ahg5)?;
        Self::check_slot("bhg5", L::BHG5, bhg5)?;
        set_field(&mut self.dat, L::AHG5, ahg5);
        set_field(&mut self.dat, L::BHG5, bhg5);
        Ok(())
    }

    /// Set the 3' hangs from a signed B hang: positive puts it on B, negative on A.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::FieldTooLarge`] if the magnitude does not fit the slot.
    pub fn set_b_hang(&mut self, b_hang: i64) -> Result<(), RangeError> {
        let (bhg3, ahg3) = if b_hang < 0 { (0, b_hang.unsigned_abs()) } else { (b_hang.unsigned_abs(), 0) };
        Self::check_slot("bhg3", L::BHG3, bhg3)?;
        Self::check_slot("ahg3", L::AHG3, ahg3)?;
        set_field(&mut self.dat, L::BHG3, bhg3);
        set_field(&mut self.dat, L::AHG3, ahg3);
        Ok(())
    }

    fn check_slot(field: &'static str, spec: FieldSpec, value: u64) -> Result<(), RangeError> {
        if value > spec.max_value() {
            Err(RangeError::FieldTooLarge { field, value, max: spec.max_value() })
        } else {
            Ok(())
        }
    }

    /// At most one read hangs off each end of the alignment.
    #[must_use]
    pub fn is_dovetail(&self) -> bool {
        (self.ahg5() == 0 || self.bhg5() == 0) && (self.ahg3() == 0 || self.bhg3() == 0)
    }

    /// A is aligned end to end.
    #[must_use]
    pub fn a_is_contained(&self) -> bool {
        self.ahg5() == 0 && self.ahg3() == 0
    }

    /// B is aligned end to end.
    #[must_use]
    pub fn b_is_contained(&self) -> bool {
        self.bhg5() == 0 && self.bhg3() == 0
    }

    /// A contains B.
    #[must_use]
    pub fn a_is_container(&self) -> bool {
        self.b_is_contained()
    }

    /// B contains A.
    #[must_use]
    pub fn b_is_container(&self) -> bool {
        self.a_is_contained()
    }

    /// Both reads hang off the 5' end of the alignment.
    #[must_use]
    pub fn five_prime_is_partial(&self) -> bool {
        self.ahg5() > 0 && self.bhg5() > 0
    }

    /// Both reads hang off the 3' end of the alignment.
    #[must_use]
    pub fn three_prime_is_partial(&self) -> bool {
        self.ahg3() > 0 && self.bhg3() > 0
    }

    /// Either end is partial.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.five_prime_is_partial() || self.three_prime_is_partial()
    }

    // The end predicates assume a dovetail overlap and do not check it.

    /// The overlap covers the 5' end of A.
    #[must_use]
    pub fn a_end_is_5prime(&self) -> bool {
        self.bhg5() > 0 && self.ahg3() > 0
    }

    /// The overlap covers the 3' end of A.
    #[must_use]
    pub fn a_end_is_3prime(&self) -> bool {
        self.ahg5() > 0 && self.bhg3() > 0
    }

    /// The overlap covers the 5' end of B.
    #[must_use]
    pub fn b_end_is_5prime(&self) -> bool {
        (self.a_end_is_5prime() && self.flipped()) || (self.a_end_is_3prime() && !self.flipped())
    }

    /// The overlap covers the 3' end of B.
    #[must_use]
    pub fn b_end_is_3prime(&self) -> bool {
        (self.a_end_is_5prime() && !self.flipped()) || (self.a_end_is_3prime() && self.flipped())
    }

    /// Start of the alignment on A.
    #[must_use]
    pub fn a_bgn(&self) -> u32 {
        self.ahg5()
    }

    /// End of the alignment on A, given A's length.
    #[must_use]
    pub fn a_end(&self, a_len: u32) -> u32 {
        a_len.saturating_sub(self.ahg3())
    }

    /// Start of the alignment on B, given B's length.
    ///
    /// Flipped overlaps report coordinates on the reverse complement, so `b_bgn > b_end`.
    #[must_use]
    pub fn b_bgn(&self, b_len: u32) -> u32 {
        if self.flipped() { b_len.saturating_sub(self.bhg5()) } else { self.bhg5() }
    }

    /// End of the alignment on B, given B's length.
    #[must_use]
    pub fn b_end(&self, b_len: u32) -> u32 {
        if self.flipped() { self.bhg3() } else { b_len.saturating_sub(self.bhg3()) }
    }

    /// Bases of A covered by the alignment.
    #[must_use]
    pub fn a_aligned_len(&self, a_len: u32) -> u32 {
        a_len.saturating_sub(self.ahg5()).saturating_sub(self.ahg3())
    }

    /// Bases of B covered by the alignment.
    #[must_use]
    pub fn b_aligned_len(&self, b_len: u32) -> u32 {
        b_len.saturating_sub(self.bhg5()).saturating_sub(self.bhg3())
    }

    /// Rank the overlap for A (or B when `for_b`) given that read's length.
    ///
    /// `floor(16384 * identity * aligned_len / read_len)`, computed in `f64`. A zero
    /// read length scores zero; results beyond `u16::MAX` saturate.
    #[must_use]
    pub fn score(&self, for_b: bool, read_len: u32) -> u16 {
        if read_len == 0 {
            return 0;
        }
        let aligned = if for_b { self.b_aligned_len(read_len) } else { self.a_aligned_len(read_len) };
        let score = (SCORE_SCALE * self.identity() * f64::from(aligned) / f64::from(read_len)).floor();
        score.clamp(0.0, f64::from(u16::MAX)) as u16
    }

    /// The same overlap seen from B.
    #[must_use]
    pub fn swapped(&self) -> Self {
        let (ahg5, ahg3, bhg5, bhg3) = if self.flipped() {
            (self.bhg3(), self.bhg5(), self.ahg3(), self.ahg5())
        } else {
            (self.bhg5(), self.bhg3(), self.ahg5(), self.ahg3())
        };
        let mut out = Self { a_id: self.b_id, b_id: self.a_id, dat: self.dat };
        // All four hang slots share one width in every layout.
        set_field(&mut out.dat, L::AHG5, u64::from(ahg5));
        set_field(&mut out.dat, L::AHG3, u64::from(ahg3));
        set_field(&mut out.dat, L::BHG5, u64::from(bhg5));
        set_field(&mut out.dat, L::BHG3, u64::from(bhg3));
        out
    }

    /// Reset to the empty sentinel.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Both ids are zero; never a valid overlap.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.a_id == 0 && self.b_id == 0
    }

    /// The packed payload words.
    #[must_use]
    pub fn words(&self) -> &L::Words {
        &self.dat
    }

    /// All logical fields.
    #[must_use]
    pub fn fields(&self) -> OverlapFields {
        OverlapFields {
            a_id: self.a_id,
            b_id: self.b_id,
            ahg5: self.ahg5(),
            ahg3: self.ahg3(),
            bhg5: self.bhg5(),
            bhg3: self.bhg3(),
            span: self.span(),
            erate: self.erate(),
            flipped: self.flipped(),
            for_trim: self.for_trim(),
            for_dedup: self.for_dedup(),
            for_graph: self.for_graph(),
        }
    }

    /// Write the payload words little-endian into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::PayloadLength`] unless `out` holds exactly
    /// [`Self::PAYLOAD_BYTES`] bytes.
    pub fn write_le_bytes(&self, out: &mut [u8]) -> Result<(), RangeError> {
        if out.len() != Self::PAYLOAD_BYTES {
            return Err(RangeError::PayloadLength { expected: Self::PAYLOAD_BYTES, actual: out.len() });
        }
        self.dat.write_le(out);
        Ok(())
    }

    /// The payload words, little-endian.
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::PAYLOAD_BYTES];
        self.dat.write_le(&mut out);
        out
    }

    /// Rebuild a record from its ids and little-endian payload.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::PayloadLength`] for a buffer of the wrong size and
    /// [`RangeError::ReservedBits`] if bits outside every field are set.
    pub fn from_le_bytes(a_id: u32, b_id: u32, bytes: &[u8]) -> Result<Self, RangeError> {
        if bytes.len() != Self::PAYLOAD_BYTES {
            return Err(RangeError::PayloadLength { expected: Self::PAYLOAD_BYTES, actual: bytes.len() });
        }
        let dat = L::Words::read_le(bytes);
        for word in 0..<L::Words as PackedWords>::NUM_WORDS {
            if dat.word(word) & !L::used_bits(word) != 0 {
                return Err(RangeError::ReservedBits { word });
            }
        }
        Ok(Self { a_id, b_id, dat })
    }
}

impl<L: OverlapLayout> fmt::Debug for OverlapRecord<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlapRecord")
            .field("layout", &L::KIND)
            .field("a_id", &self.a_id)
            .field("b_id", &self.b_id)
            .field("ahg5", &self.ahg5())
            .field("ahg3", &self.ahg3())
            .field("bhg5", &self.bhg5())
            .field("bhg3", &self.bhg3())
            .field("span", &self.span())
            .field("evalue", &self.evalue())
            .field("flipped", &self.flipped())
            .field("for_trim", &self.for_trim())
            .field("for_dedup", &self.for_dedup())
            .field("for_graph", &self.for_graph())
            .finish()
    }
}

/// Encodes [`OverlapFields`] into records of layout `L` under one [`Profile`].
#[derive(Debug, Clone, Copy)]
pub struct OverlapCodec<L: OverlapLayout> {
    profile: Profile,
    max_len: u32,
    _layout: PhantomData<L>,
}

impl<L: OverlapLayout> OverlapCodec<L> {
    /// Build a codec for `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::LayoutMismatch`] if `profile` selects a layout other than `L`.
    pub fn new(profile: Profile) -> Result<Self, ProfileError> {
        profile.check_layout::<L>()?;
        Ok(Self { profile, max_len: profile.max_read_len(), _layout: PhantomData })
    }

    /// The profile this codec enforces.
    #[must_use]
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Largest hang or span accepted.
    #[must_use]
    pub fn max_read_len(&self) -> u32 {
        self.max_len
    }

    fn check_len(&self, field: &'static str, value: u32) -> Result<(), RangeError> {
        if value > self.max_len {
            Err(RangeError::FieldTooLarge { field, value: u64::from(value), max: u64::from(self.max_len) })
        } else {
            Ok(())
        }
    }

    /// Check that `fields` can be encoded without touching a record.
    ///
    /// # Errors
    ///
    /// Returns the first [`RangeError`] found.
    pub fn check(&self, fields: &OverlapFields) -> Result<(), RangeError> {
        self.check_len("ahg5", fields.ahg5)?;
        self.check_len("ahg3", fields.ahg3)?;
        self.check_len("bhg5", fields.bhg5)?;
        self.check_len("bhg3", fields.bhg3)?;
        self.check_len("span", fields.span)?;
        encode_evalue(fields.erate).map(|_| ())
    }

    /// Check that a record's hangs and span are within the profile bound.
    ///
    /// # Errors
    ///
    /// Returns the first [`RangeError`] found.
    pub fn check_record(&self, record: &OverlapRecord<L>) -> Result<(), RangeError> {
        self.check_len("ahg5", record.ahg5())?;
        self.check_len("ahg3", record.ahg3())?;
        self.check_len("bhg5", record.bhg5())?;
        self.check_len("bhg3", record.bhg3())?;
        self.check_len("span", record.span())
    }

    /// Pack `fields`. Never truncates.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] if a hang or span exceeds the profile bound or the
    /// error fraction is negative or NaN.
    pub fn encode(&self, fields: &OverlapFields) -> Result<OverlapRecord<L>, RangeError> {
        self.check(fields)?;
        let mut record = OverlapRecord::new(fields.a_id, fields.b_id);
        record.set_ahg5(fields.ahg5)?;
        record.set_ahg3(fields.ahg3)?;
        record.set_bhg5(fields.bhg5)?;
        record.set_bhg3(fields.bhg3)?;
        record.set_span(fields.span)?;
        record.set_erate(fields.erate)?;
        record.set_flipped(fields.flipped);
        record.set_for_trim(fields.for_trim);
        record.set_for_dedup(fields.for_dedup);
        record.set_for_graph(fields.for_graph);
        Ok(record)
    }

    /// Unpack a record.
    #[must_use]
    pub fn decode(&self, record: &OverlapRecord<L>) -> OverlapFields {
        record.fields()
    }
}
