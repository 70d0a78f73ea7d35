//! Fixed-point encoding of alignment error fractions.
//!
//! Error fractions are stored as a 12-bit integer in units of 0.01%, giving a
//! representable range of `[0, 0.4095]`. Every layout reserves exactly
//! [`EVALUE_BITS`] for this value.

use crate::error::RangeError;

/// Number of bits used to store an encoded error fraction.
pub const EVALUE_BITS: u32 = 12;

/// Largest encoded error value.
pub const MAX_EVALUE: u16 = (1 << EVALUE_BITS) - 1;

/// Encoded units per unit of error fraction.
pub const EVALUE_SCALE: f64 = 10_000.0;

/// Largest representable error fraction (0.4095).
pub const MAX_ERATE: f64 = MAX_EVALUE as f64 / EVALUE_SCALE;

/// Decode a stored error value into an error fraction.
///
/// ```
/// use ovlpipe_record::evalue::decode_evalue;
/// assert_eq!(decode_evalue(250), 0.025);
/// ```
#[inline]
#[must_use]
pub fn decode_evalue(evalue: u16) -> f64 {
    f64::from(evalue) / EVALUE_SCALE
}

/// Encode an error fraction, rounding half up to the nearest 0.01%.
///
/// Fractions at or above [`MAX_ERATE`] saturate to [`MAX_EVALUE`].
///
/// # Errors
///
/// Returns [`RangeError::InvalidErrorRate`] for negative or NaN fractions.
#[inline]
pub fn encode_evalue(erate: f64) -> Result<u16, RangeError> {
    if erate.is_nan() || erate < 0.0 {
        return Err(RangeError::InvalidErrorRate(erate));
    }
    if erate >= MAX_ERATE {
        return Ok(MAX_EVALUE);
    }
    Ok((erate * EVALUE_SCALE + 0.5).floor() as u16)
}
