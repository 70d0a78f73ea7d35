//! Error types for encoding overlap records and selecting profiles.

use thiserror::Error;

use crate::profile::ProfileKind;

/// A value could not be represented in the packed record.
///
/// This is always fatal to the record, never to a run: callers decide whether to
/// drop the record or abort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    /// An integer field is larger than the active bound.
    #[error("{field} value {value} exceeds the maximum of {max}")]
    FieldTooLarge {
        /// Name of the logical field
        field: &'static str,
        /// The rejected value
        value: u64,
        /// Largest value the profile (or storage slot) accepts
        max: u64,
    },

    /// An error fraction that is negative or not a number.
    #[error("error fraction {0} is not representable")]
    InvalidErrorRate(f64),

    /// A packed payload of the wrong size.
    #[error("packed payload has {actual} bytes, expected {expected}")]
    PayloadLength {
        /// Bytes required by the layout
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// A packed payload with bits set outside of every field.
    #[error("packed payload has reserved bits set in word {word}")]
    ReservedBits {
        /// Index of the offending word
        word: usize,
    },
}

/// The profile configuration is invalid or does not match the layout in use.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    /// Read length bit width outside `1..=32`.
    #[error("read length bits must be between 1 and 32, got {0}")]
    InvalidWidth(u32),

    /// A codec or pipeline was built for a different layout than the profile selects.
    #[error("profile is {configured} but the record layout is {layout}")]
    LayoutMismatch {
        /// Kind selected by the profile
        configured: ProfileKind,
        /// Kind of the layout type in use
        layout: ProfileKind,
    },
}
