//! # Core Value Types
//!
//! Identity, product identifiers and logical timestamps used by every
//! crate in the workspace.

use crate::errors::IdentityParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Logical timestamp supplied by the host at call time.
///
/// Monotonically non-decreasing across committed operations.
pub type Timestamp = u64;

// =============================================================================
// IDENTITY (20 bytes)
// =============================================================================

/// An opaque, host-authenticated principal reference.
///
/// Address-style 20-byte value. `Identity::ZERO` is the null identity and is
/// never a valid owner, manufacturer or authorization target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity(pub [u8; 20]);

impl Identity {
    /// Length of an identity in bytes.
    pub const LEN: usize = 20;

    /// The null identity (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an identity from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an identity from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Creates an identity whose last byte is `tag` and all others zero.
    ///
    /// Handy for fixtures and demo scripts.
    #[must_use]
    pub const fn from_low_byte(tag: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = tag;
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the null identity.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes =
            hex::decode(digits).map_err(|e| IdentityParseError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes).ok_or(IdentityParseError::InvalidLength {
            expected: Self::LEN,
            actual: bytes.len(),
        })
    }
}

impl From<[u8; 20]> for Identity {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// PRODUCT ID
// =============================================================================

/// Identifier of a tracked item.
///
/// Assigned sequentially starting at 1 and never reused. Zero is never a
/// valid id.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl ProductId {
    /// The first id handed out by a fresh registry.
    pub const FIRST: Self = Self(1);

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the id that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_identity() {
        assert!(Identity::ZERO.is_zero());
        assert!(!Identity::from_low_byte(1).is_zero());
    }

    #[test]
    fn test_identity_display_and_parse() {
        let id = Identity::from_low_byte(0xAB);
        let text = id.to_string();
        assert_eq!(text, "0x00000000000000000000000000000000000000ab");
        assert_eq!(text.parse::<Identity>().unwrap(), id);
        assert_eq!(
            "00000000000000000000000000000000000000AB"
                .parse::<Identity>()
                .unwrap(),
            id
        );
    }

    #[test]
    fn test_identity_parse_errors() {
        assert!(matches!(
            "0x1234".parse::<Identity>(),
            Err(IdentityParseError::InvalidLength {
                expected: 20,
                actual: 2
            })
        ));
        assert!(matches!(
            "0xzz".parse::<Identity>(),
            Err(IdentityParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_identity_serde_as_hex_string() {
        let id = Identity::from_low_byte(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0x0000000000000000000000000000000000000007\"");
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_product_id_sequence() {
        assert_eq!(ProductId::FIRST.get(), 1);
        assert_eq!(ProductId::FIRST.next(), ProductId(2));
        assert_eq!(ProductId(3).to_string(), "#3");
        assert_eq!(serde_json::to_string(&ProductId(9)).unwrap(), "9");
    }
}
