//! Packed word layouts for overlap records.
//!
//! Each layout is a zero-sized marker type naming the word array used for
//! storage and the position of every logical field within it. All reads and
//! writes go through [`get_field`] and [`set_field`], so adding a layout only
//! means describing its fields.

use std::fmt::Debug;
use std::hash::Hash;

use crate::evalue::EVALUE_BITS;
use crate::profile::ProfileKind;

/// Position and width of one field inside a packed word array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    /// Index of the word holding the field.
    pub word: usize,
    /// Bit offset of the field's least significant bit within the word.
    pub shift: u32,
    /// Field width in bits (1..=32).
    pub width: u32,
}

impl FieldSpec {
    /// Describe a field of `width` bits starting at bit `shift` of word `word`.
    #[must_use]
    pub const fn new(word: usize, shift: u32, width: u32) -> Self {
        Self { word, shift, width }
    }

    /// Largest value the field can hold.
    #[inline]
    #[must_use]
    pub const fn max_value(self) -> u64 {
        (1u64 << self.width) - 1
    }

    /// The field's bits in position within its word.
    #[inline]
    #[must_use]
    pub const fn word_mask(self) -> u64 {
        self.max_value() << self.shift
    }
}

/// Fixed-size array of storage words backing a packed record.
pub trait PackedWords:
    Copy + Default + Debug + PartialEq + Eq + PartialOrd + Ord + Hash + Send + Sync + 'static
{
    /// Bits per word.
    const WORD_BITS: u32;
    /// Number of words.
    const NUM_WORDS: usize;
    /// Bytes in the little-endian serialized form.
    const NUM_BYTES: usize = Self::NUM_WORDS * (Self::WORD_BITS as usize / 8);

    /// Read word `index`, widened to 64 bits.
    fn word(&self, index: usize) -> u64;

    /// Overwrite word `index`; bits above `WORD_BITS` are discarded.
    fn set_word(&mut self, index: usize, value: u64);

    /// Write the words little-endian into `out`, which must hold `NUM_BYTES` bytes.
    fn write_le(&self, out: &mut [u8]);

    /// Read words from a little-endian buffer of exactly `NUM_BYTES` bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_packed_words {
    ($word:ty, $count:literal) => {
        impl PackedWords for [$word; $count] {
            const WORD_BITS: u32 = <$word>::BITS;
            const NUM_WORDS: usize = $count;

            #[inline]
            fn word(&self, index: usize) -> u64 {
                u64::from(self[index])
            }

            #[inline]
            fn set_word(&mut self, index: usize, value: u64) {
                self[index] = value as $word;
            }

            fn write_le(&self, out: &mut [u8]) {
                debug_assert_eq!(out.len(), Self::NUM_BYTES);
                for (chunk, word) in out.chunks_exact_mut(size_of::<$word>()).zip(self) {
                    chunk.copy_from_slice(&word.to_le_bytes());
                }
            }

            fn read_le(bytes: &[u8]) -> Self {
                debug_assert_eq!(bytes.len(), Self::NUM_BYTES);
                let mut words = [0; $count];
                for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(size_of::<$word>())) {
                    let mut buf = [0u8; size_of::<$word>()];
                    buf.copy_from_slice(chunk);
                    *word = <$word>::from_le_bytes(buf);
                }
                words
            }
        }
    };
}

impl_packed_words!(u32, 3);
impl_packed_words!(u64, 2);
impl_packed_words!(u32, 6);

/// A packed overlap layout.
///
/// Every layout exposes the same logical fields; only their storage differs.
pub trait OverlapLayout:
    Copy + Default + Debug + PartialEq + Eq + PartialOrd + Ord + Hash + Send + Sync + 'static
{
    /// Storage words.
    type Words: PackedWords;

    /// The profile kind this layout implements.
    const KIND: ProfileKind;
    /// Storage bits for each hang and the span.
    const HANG_BITS: u32;

    /// 5' hang of read A.
    const AHG5: FieldSpec;
    /// 3' hang of read A.
    const AHG3: FieldSpec;
    /// 5' hang of read B.
    const BHG5: FieldSpec;
    /// 3' hang of read B.
    const BHG3: FieldSpec;
    /// Alignment span.
    const SPAN: FieldSpec;
    /// Encoded error fraction.
    const EVALUE: FieldSpec;
    /// B is reverse-complemented relative to A.
    const FLIPPED: FieldSpec;
    /// Usable for overlap-based trimming.
    const FOR_TRIM: FieldSpec;
    /// Usable for duplicate detection.
    const FOR_DEDUP: FieldSpec;
    /// Usable for graph construction.
    const FOR_GRAPH: FieldSpec;

    /// All fields in a fixed order.
    #[must_use]
    fn fields() -> [FieldSpec; 10] {
        [
            Self::AHG5,
            Self::AHG3,
            Self::BHG5,
            Self::BHG3,
            Self::SPAN,
            Self::EVALUE,
            Self::FLIPPED,
            Self::FOR_TRIM,
            Self::FOR_DEDUP,
            Self::FOR_GRAPH,
        ]
    }

    /// Bits of word `index` that belong to some field.
    #[must_use]
    fn used_bits(index: usize) -> u64 {
        Self::fields().iter().filter(|f| f.word == index).fold(0, |acc, f| acc | f.word_mask())
    }
}

/// Read a field.
#[inline]
#[must_use]
pub fn get_field<W: PackedWords>(words: &W, spec: FieldSpec) -> u64 {
    (words.word(spec.word) >> spec.shift) & spec.max_value()
}

/// Write a field. Callers range-check `value`; excess bits are masked off.
#[inline]
pub fn set_field<W: PackedWords>(words: &mut W, spec: FieldSpec, value: u64) {
    debug_assert!(value <= spec.max_value(), "value {value} overflows {spec:?}");
    let cleared = words.word(spec.word) & !spec.word_mask();
    words.set_word(spec.word, cleared | ((value & spec.max_value()) << spec.shift));
}

/// 96-bit layout for reads of up to 16 bits.
///
/// ```text
/// word0: ahg5[0..16)  ahg3[16..32)
/// word1: bhg5[0..16)  bhg3[16..32)
/// word2: span[0..16)  evalue[16..28)  flipped[28]  trim[29]  dedup[30]  graph[31]
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Narrow;

impl OverlapLayout for Narrow {
    type Words = [u32; 3];

    const KIND: ProfileKind = ProfileKind::Narrow;
    const HANG_BITS: u32 = 16;

    const AHG5: FieldSpec = FieldSpec::new(0, 0, 16);
    const AHG3: FieldSpec = FieldSpec::new(0, 16, 16);
    const BHG5: FieldSpec = FieldSpec::new(1, 0, 16);
    const BHG3: FieldSpec = FieldSpec::new(1, 16, 16);
    const SPAN: FieldSpec = FieldSpec::new(2, 0, 16);
    const EVALUE: FieldSpec = FieldSpec::new(2, 16, EVALUE_BITS);
    const FLIPPED: FieldSpec = FieldSpec::new(2, 28, 1);
    const FOR_TRIM: FieldSpec = FieldSpec::new(2, 29, 1);
    const FOR_DEDUP: FieldSpec = FieldSpec::new(2, 30, 1);
    const FOR_GRAPH: FieldSpec = FieldSpec::new(2, 31, 1);
}

/// 128-bit layout for reads of 17 to 21 bits.
///
/// ```text
/// word0: ahg5[0..21)  ahg3[21..42)  evalue[42..54)  flipped[54]  trim[55]  dedup[56]  graph[57]
/// word1: bhg5[0..21)  bhg3[21..42)  span[42..63)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Medium;

impl OverlapLayout for Medium {
    type Words = [u64; 2];

    const KIND: ProfileKind = ProfileKind::Medium;
    const HANG_BITS: u32 = 21;

    const AHG5: FieldSpec = FieldSpec::new(0, 0, 21);
    const AHG3: FieldSpec = FieldSpec::new(0, 21, 21);
    const EVALUE: FieldSpec = FieldSpec::new(0, 42, EVALUE_BITS);
    const FLIPPED: FieldSpec = FieldSpec::new(0, 54, 1);
    const FOR_TRIM: FieldSpec = FieldSpec::new(0, 55, 1);
    const FOR_DEDUP: FieldSpec = FieldSpec::new(0, 56, 1);
    const FOR_GRAPH: FieldSpec = FieldSpec::new(0, 57, 1);
    const BHG5: FieldSpec = FieldSpec::new(1, 0, 21);
    const BHG3: FieldSpec = FieldSpec::new(1, 21, 21);
    const SPAN: FieldSpec = FieldSpec::new(1, 42, 21);
}

/// 192-bit layout with unpacked 32-bit hangs and span.
///
/// ```text
/// word0..word4: ahg5, ahg3, bhg5, bhg3, span
/// word5: evalue[0..12)  flipped[12]  trim[13]  dedup[14]  graph[15]
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wide;

impl OverlapLayout for Wide {
    type Words = [u32; 6];

    const KIND: ProfileKind = ProfileKind::Wide;
    const HANG_BITS: u32 = 32;

    const AHG5: FieldSpec = FieldSpec::new(0, 0, 32);
    const AHG3: FieldSpec = FieldSpec::new(1, 0, 32);
    const BHG5: FieldSpec = FieldSpec::new(2, 0, 32);
    const BHG3: FieldSpec = FieldSpec::new(3, 0, 32);
    const SPAN: FieldSpec = FieldSpec::new(4, 0, 32);
    const EVALUE: FieldSpec = FieldSpec::new(5, 0, EVALUE_BITS);
    const FLIPPED: FieldSpec = FieldSpec::new(5, 12, 1);
    const FOR_TRIM: FieldSpec = FieldSpec::new(5, 13, 1);
    const FOR_DEDUP: FieldSpec = FieldSpec::new(5, 14, 1);
    const FOR_GRAPH: FieldSpec = FieldSpec::new(5, 15, 1);
}
