//! Selection of a packed layout from the maximum read length bit width.
//!
//! | kind     | read length bits `W` | hang/span slot | record payload |
//! |----------|----------------------|----------------|----------------|
//! | narrow   | `W < 17`             | 16 bits        | 96 bits        |
//! | medium   | `17 <= W < 22`       | 21 bits        | 128 bits       |
//! | wide     | `W >= 22`            | 32 bits        | 192 bits       |
//!
//! The slot width is the storage capacity of the layout; the profile bound
//! `2^W - 1` is what the codec enforces.

use std::fmt;

use crate::error::ProfileError;
use crate::layout::OverlapLayout;

/// The three supported record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// Three 32-bit words.
    Narrow,
    /// Two 64-bit words.
    Medium,
    /// Six 32-bit words.
    Wide,
}

impl ProfileKind {
    /// The kind used for reads whose lengths need `read_len_bits` bits.
    ///
    /// Returns `None` for widths outside `1..=32`.
    #[must_use]
    pub fn for_read_len_bits(read_len_bits: u32) -> Option<Self> {
        match read_len_bits {
            1..=16 => Some(Self::Narrow),
            17..=21 => Some(Self::Medium),
            22..=32 => Some(Self::Wide),
            _ => None,
        }
    }

    /// Total payload bits of a record of this kind.
    #[must_use]
    pub const fn payload_bits(self) -> u32 {
        match self {
            Self::Narrow => 96,
            Self::Medium => 128,
            Self::Wide => 192,
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Narrow => "narrow",
            Self::Medium => "medium",
            Self::Wide => "wide",
        };
        f.write_str(name)
    }
}

/// Immutable record width configuration for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Profile {
    kind: ProfileKind,
    read_len_bits: u32,
}

impl Profile {
    /// Read length bit width used when none is configured.
    pub const DEFAULT_READ_LEN_BITS: u32 = 21;

    /// Select the profile for reads of at most `2^read_len_bits - 1` bases.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidWidth`] unless `1 <= read_len_bits <= 32`.
    pub fn for_read_len_bits(read_len_bits: u32) -> Result<Self, ProfileError> {
        let kind = ProfileKind::for_read_len_bits(read_len_bits)
            .ok_or(ProfileError::InvalidWidth(read_len_bits))?;
        Ok(Self { kind, read_len_bits })
    }

    /// The layout kind this profile selects.
    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    /// The configured read length bit width.
    #[must_use]
    pub fn read_len_bits(&self) -> u32 {
        self.read_len_bits
    }

    /// Largest hang or span accepted under this profile.
    #[must_use]
    pub fn max_read_len(&self) -> u32 {
        ((1u64 << self.read_len_bits) - 1) as u32
    }

    /// Verify that the layout type `L` is the one this profile selects.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::LayoutMismatch`] when the kinds differ.
    pub fn check_layout<L: OverlapLayout>(&self) -> Result<(), ProfileError> {
        if L::KIND == self.kind {
            Ok(())
        } else {
            Err(ProfileError::LayoutMismatch { configured: self.kind, layout: L::KIND })
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self { kind: ProfileKind::Medium, read_len_bits: Self::DEFAULT_READ_LEN_BITS }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bit reads)", self.kind, self.read_len_bits)
    }
}
