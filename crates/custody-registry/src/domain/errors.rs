//! # Error Types
//!
//! Every registry operation either completes fully or fails with one of the
//! three `RegistryError` variants, before any state is touched.

use crate::domain::invariants::InvariantViolation;
use serde::{Deserialize, Serialize};
use shared_types::{Identity, ProductId};
use std::fmt;
use thiserror::Error;

// =============================================================================
// REGISTRY ERRORS
// =============================================================================

/// Errors returned by registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Malformed, empty or null input.
    #[error("invalid argument: {0}")]
    InvalidArgument(ArgumentError),

    /// Caller lacks the role or ownership the operation requires.
    #[error("permission denied: {caller} is not {required}")]
    PermissionDenied {
        /// The rejected caller.
        caller: Identity,
        /// What the operation required of the caller.
        required: Requirement,
    },

    /// The referenced id has no record.
    #[error("product {0} not found")]
    NotFound(ProductId),
}

impl RegistryError {
    /// Returns the taxonomy tag of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl From<ArgumentError> for RegistryError {
    fn from(err: ArgumentError) -> Self {
        Self::InvalidArgument(err)
    }
}

/// The error taxonomy, without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`RegistryError::InvalidArgument`].
    InvalidArgument,
    /// See [`RegistryError::PermissionDenied`].
    PermissionDenied,
    /// See [`RegistryError::NotFound`].
    NotFound,
}

impl ErrorKind {
    /// Stable name of the error kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::PermissionDenied => "PermissionDenied",
            Self::NotFound => "NotFound",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which argument was rejected, and why.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentError {
    /// Product name was empty.
    #[error("product name must not be empty")]
    EmptyName,

    /// Status text was empty.
    #[error("status must not be empty")]
    EmptyStatus,

    /// Manufacturer was the null identity.
    #[error("manufacturer must not be the null identity")]
    NullManufacturer,

    /// New owner was the null identity.
    #[error("new owner must not be the null identity")]
    NullOwner,

    /// New owner is already the current owner.
    #[error("new owner must differ from the current owner")]
    SameOwner,

    /// Authorization target was the null identity.
    #[error("identity must not be the null identity")]
    NullIdentity,

    /// Admin was the null identity at initialisation.
    #[error("admin must not be the null identity")]
    NullAdmin,
}

/// The role an operation demanded of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Only the admin may call.
    Admin,
    /// Admin or an authorized principal may call.
    Authorized,
    /// Only the record's current owner may call.
    CurrentOwner(Identity),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("the admin"),
            Self::Authorized => f.write_str("an authorized principal"),
            Self::CurrentOwner(owner) => write!(f, "the current owner ({owner})"),
        }
    }
}

// =============================================================================
// SNAPSHOT ERRORS
// =============================================================================

/// Errors from restoring a registry snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Snapshot format version is not understood.
    #[error("unsupported snapshot version: received {received}, supported {supported}")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        received: u16,
        /// Version this build reads.
        supported: u16,
    },

    /// Admin was the null identity.
    #[error("snapshot admin must not be the null identity")]
    NullAdmin,

    /// An authorization entry named the null identity.
    #[error("snapshot authorizes the null identity")]
    NullAuthorization,

    /// Record ids are not exactly 1..=n in order.
    #[error("snapshot ids are not contiguous: expected {expected}, found {found}")]
    NonContiguousIds {
        /// Id the next record should have had.
        expected: ProductId,
        /// Id it actually had.
        found: ProductId,
    },

    /// The id counter disagrees with the records present.
    #[error("snapshot counter {counter} does not match {records} records")]
    CounterMismatch {
        /// Stored id counter.
        counter: u64,
        /// Number of records in the snapshot.
        records: u64,
    },

    /// A record and its history break a data-model invariant.
    #[error("product {id} violates invariants: {violations:?}")]
    InvariantViolated {
        /// The offending record.
        id: ProductId,
        /// Every violation found.
        violations: Vec<InvariantViolation>,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::NotFound(ProductId(7));
        assert_eq!(err.to_string(), "product #7 not found");

        let err: RegistryError = ArgumentError::EmptyName.into();
        assert_eq!(
            err.to_string(),
            "invalid argument: product name must not be empty"
        );

        let err = RegistryError::PermissionDenied {
            caller: Identity::from_low_byte(2),
            required: Requirement::Admin,
        };
        assert!(err.to_string().contains("is not the admin"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            RegistryError::NotFound(ProductId(1)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RegistryError::from(ArgumentError::SameOwner).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            RegistryError::PermissionDenied {
                caller: Identity::ZERO,
                required: Requirement::Authorized,
            }
            .kind()
            .as_str(),
            "PermissionDenied"
        );
    }

    #[test]
    fn test_snapshot_error_display_names_fields() {
        let err = SnapshotError::UnsupportedVersion {
            received: 9,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "unsupported snapshot version: received 9, supported 1"
        );

        let err = SnapshotError::NonContiguousIds {
            expected: ProductId(2),
            found: ProductId(4),
        };
        assert_eq!(
            err.to_string(),
            "snapshot ids are not contiguous: expected #2, found #4"
        );

        let err = SnapshotError::CounterMismatch {
            counter: 3,
            records: 2,
        };
        assert_eq!(err.to_string(), "snapshot counter 3 does not match 2 records");
    }

    #[test]
    fn test_requirement_display_names_owner() {
        let owner = Identity::from_low_byte(0xB0);
        let text = Requirement::CurrentOwner(owner).to_string();
        assert!(text.contains(&owner.to_string()));
    }
}
