//! Error types for SDES keying and SRTP key handling.

use thiserror::Error;

/// Failure to turn signaled key material into bytes of the right shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 key material: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid hex string: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("key material has wrong length: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Errors raised while setting up an SRTP crypto context.
#[derive(Debug, Error)]
pub enum Error {
    /// The suite name has no registered entry.
    #[error("unknown SRTP crypto suite: {0}")]
    UnknownSuite(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("malformed crypto attribute: {0}")]
    Attribute(String),

    #[error("OS random number generator failed: {0}")]
    Random(#[from] getrandom::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
