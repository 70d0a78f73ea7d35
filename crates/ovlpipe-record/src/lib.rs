#![deny(unsafe_code)]

//! Bit-packed pairwise overlap records.
//!
//! This crate provides:
//! - [`evalue`]: 12-bit fixed-point quantization of alignment error fractions
//! - [`layout`]: the three packed layouts (`Narrow`, `Medium`, `Wide`) and the
//!   generic field accessors shared by all of them
//! - [`profile`]: selection of a layout from the maximum read length bit width
//! - [`record`]: [`OverlapRecord`], its codec and derived classifications
//! - [`display`]: text renderings of a record (hangs, coordinates, raw, PAF)
//!
//! # Example
//!
//! ```
//! use ovlpipe_record::{Medium, OverlapCodec, OverlapFields, Profile};
//!
//! let profile = Profile::for_read_len_bits(21).unwrap();
//! let codec = OverlapCodec::<Medium>::new(profile).unwrap();
//!
//! let fields = OverlapFields { a_id: 1, b_id: 2, bhg5: 5, span: 900, erate: 0.02, ..Default::default() };
//! let record = codec.encode(&fields).unwrap();
//!
//! assert!(record.is_dovetail());
//! assert!(record.a_is_contained());
//! assert_eq!(record.a_hang(), -5);
//! ```

pub mod display;
pub mod error;
pub mod evalue;
pub mod layout;
pub mod profile;
pub mod record;

pub use display::{DisplayOverlap, OverlapDisplay};
pub use error::{ProfileError, RangeError};
pub use evalue::{MAX_ERATE, MAX_EVALUE, decode_evalue, encode_evalue};
pub use layout::{FieldSpec, Medium, Narrow, OverlapLayout, PackedWords, Wide};
pub use profile::{Profile, ProfileKind};
pub use record::{OverlapCodec, OverlapFields, OverlapRecord};
