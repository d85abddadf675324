//! Hex and base64 conversions used where key material crosses a text boundary
//! (config strings, SDES attributes, test vectors).

use base64::Engine;

use crate::srtp::DecodeError;

/// Lowercase hex encoding.
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string (either case). Surrounding whitespace is ignored.
pub fn hex_decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(hex::decode(s.trim())?)
}

/// Standard, padded base64 (RFC 4648), the alphabet SDES inline keys use.
pub fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64. Surrounding whitespace is ignored.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(s.trim())?)
}
