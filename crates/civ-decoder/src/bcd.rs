//! BCD field codecs
//!
//! CI-V packs decimal numbers two digits per byte: the high nibble holds the
//! tens digit and the low nibble the units digit. Multi-byte fields come in
//! two orders:
//!
//! - **Little-endian** (frequencies, offsets): least significant byte first,
//!   e.g. 14.250.000 Hz = `00 00 25 14 00`
//! - **Big-endian** (levels, status values, dates): most significant byte first,
//!   e.g. 128 = `01 28`

use crate::error::DecodeError;

/// Decode one BCD byte into 0..=99, rejecting nibbles above 9
pub fn decode_bcd_byte(byte: u8) -> Result<u8, DecodeError> {
    let high = byte >> 4;
    let low = byte & 0x0F;
    if high > 9 || low > 9 {
        return Err(DecodeError::InvalidBcd(byte));
    }
    Ok(high * 10 + low)
}

/// Check that every byte of a field is valid BCD
pub fn validate_bcd(bytes: &[u8]) -> Result<(), DecodeError> {
    bytes.iter().try_for_each(|&byte| decode_bcd_byte(byte).map(drop))
}

/// Raw `(high * 10) + low` arithmetic without digit validation
///
/// Out-of-range nibbles give a wrong but non-panicking result (up to 165).
pub fn bcd_byte_unchecked(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

/// Decode little-endian BCD into an unsigned magnitude
///
/// Each byte contributes its units nibble, then its tens nibble, at increasing
/// powers of ten. The unit of the result is whatever the field uses; callers
/// apply their own scaling. Values that do not fit in a u64 are rejected with
/// [`DecodeError::Overflow`].
pub fn decode_bcd_le(bytes: &[u8]) -> Result<u64, DecodeError> {
    // Most significant byte last, so fold from the end
    bytes.iter().rev().try_fold(0u64, |acc, &byte| {
        let pair = u64::from(decode_bcd_byte(byte)?);
        acc.checked_mul(100)
            .and_then(|v| v.checked_add(pair))
            .ok_or(DecodeError::Overflow { len: bytes.len() })
    })
}

/// Decode big-endian BCD digit pairs (`[0x46, 0x92]` → 4692)
///
/// Fields longer than u64 can hold saturate at `u64::MAX`.
pub fn decode_bcd_be(bytes: &[u8]) -> Result<u64, DecodeError> {
    bytes.iter().try_fold(0u64, |acc, &byte| {
        Ok(acc
            .saturating_mul(100)
            .saturating_add(decode_bcd_byte(byte)? as u64))
    })
}

/// Decode a little-endian magnitude followed by a sign byte
///
/// A sign byte of 0 is positive, anything else negative.
pub fn decode_signed_le(magnitude: &[u8], sign: u8) -> Result<i64, DecodeError> {
    let value = decode_bcd_le(magnitude)? as i64;
    Ok(if sign == 0 { value } else { -value })
}

/// Encode a value as `len` bytes of little-endian BCD
///
/// Digits beyond `len * 2` are dropped.
pub fn encode_bcd_le(value: u64, len: usize) -> Vec<u8> {
    let mut result = Vec::with_capacity(len);
    let mut remaining = value;

    for _ in 0..len {
        let low = (remaining % 10) as u8;
        remaining /= 10;
        let high = (remaining % 10) as u8;
        remaining /= 10;
        result.push((high << 4) | low);
    }

    result
}

/// Encode a value as `len` bytes of big-endian BCD
pub fn encode_bcd_be(value: u64, len: usize) -> Vec<u8> {
    let mut result = encode_bcd_le(value, len);
    result.reverse();
    result
}
