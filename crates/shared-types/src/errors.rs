//! # Error Types
//!
//! Errors raised while decoding shared value types.

use thiserror::Error;

/// Errors produced when parsing an [`Identity`](crate::Identity) from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityParseError {
    /// The input was not valid hexadecimal.
    #[error("invalid hex in identity: {0}")]
    InvalidHex(String),

    /// The decoded input had the wrong number of bytes.
    #[error("identity must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte count.
        expected: usize,
        /// Byte count decoded.
        actual: usize,
    },
}
