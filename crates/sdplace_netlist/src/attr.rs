//! Bitfield attribute encoding.
//!
//! The host tool stores bitfield attributes as strings of binary digits,
//! most significant bit first (e.g. `"0001001010100011"`).

use crate::error::NetlistError;

/// Decodes a binary-string attribute value.
pub fn parse_bits(value: &str) -> Result<u64, NetlistError> {
    let v = value.trim();
    if v.is_empty() || !v.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(NetlistError::BadBits(value.to_string()));
    }
    // Leading zeros beyond 64 bits carry no information
    let significant = v.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(significant, 2).map_err(|_| NetlistError::BadBits(value.to_string()))
}

/// Encodes `value` as a binary string of exactly `width` digits.
pub fn format_bits(value: u64, width: usize) -> String {
    format!("{value:0width$b}")
}
