//! # Registry Snapshots
//!
//! The complete durable state of a registry: admin, authorization map,
//! records with their histories, and the id counter. Snapshots are plain
//! serde values; the host decides how to store them.
//!
//! Restoring validates everything a running registry guarantees by
//! construction, so a tampered or truncated snapshot is rejected rather
//! than loaded.

use crate::domain::access::AccessControl;
use crate::domain::entities::ProductDetails;
use crate::domain::errors::SnapshotError;
use crate::domain::invariants::{check_record_invariants, InvariantCheckResult};
use crate::domain::registry::{Entry, Registry};
use serde::{Deserialize, Serialize};
use shared_types::{Identity, ProductId, Timestamp};
use std::collections::BTreeMap;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// One entry of the authorization map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    /// The principal.
    pub identity: Identity,
    /// Whether it may register records.
    pub authorized: bool,
}

/// Serializable image of a registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Format version.
    pub version: u16,
    /// Admin fixed at initialisation.
    pub admin: Identity,
    /// Authorization map entries.
    pub authorizations: Vec<AuthorizationRecord>,
    /// Every record with its history, in id order.
    pub products: Vec<ProductDetails>,
    /// Last id handed out.
    pub last_id: u64,
}

impl RegistrySnapshot {
    /// Latest timestamp in any stored history (0 when empty).
    #[must_use]
    pub fn latest_timestamp(&self) -> Timestamp {
        self.products
            .iter()
            .flat_map(|details| details.history.iter().map(|h| h.timestamp))
            .max()
            .unwrap_or(0)
    }
}

impl Registry {
    /// Captures the full state of this registry.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            version: SNAPSHOT_VERSION,
            admin: self.admin(),
            authorizations: self
                .access()
                .entries()
                .map(|(identity, authorized)| AuthorizationRecord {
                    identity,
                    authorized,
                })
                .collect(),
            products: self
                .entries()
                .map(|entry| ProductDetails {
                    record: entry.record.clone(),
                    history: entry.history.clone(),
                })
                .collect(),
            last_id: self.total_count(),
        }
    }

    /// Rebuilds a registry from a snapshot.
    ///
    /// # Errors
    ///
    /// Any `SnapshotError` if the snapshot breaks a registry invariant.
    pub fn restore(snapshot: RegistrySnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                received: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if snapshot.admin.is_zero() {
            return Err(SnapshotError::NullAdmin);
        }
        if snapshot
            .authorizations
            .iter()
            .any(|auth| auth.identity.is_zero())
        {
            return Err(SnapshotError::NullAuthorization);
        }

        let record_count = snapshot.products.len() as u64;
        if snapshot.last_id != record_count {
            return Err(SnapshotError::CounterMismatch {
                counter: snapshot.last_id,
                records: record_count,
            });
        }

        let mut products = BTreeMap::new();
        let mut expected = ProductId::FIRST;
        for details in snapshot.products {
            let id = details.record.id;
            if id != expected {
                return Err(SnapshotError::NonContiguousIds {
                    expected,
                    found: id,
                });
            }
            if let InvariantCheckResult::Invalid(violations) =
                check_record_invariants(&details.record, &details.history)
            {
                return Err(SnapshotError::InvariantViolated { id, violations });
            }
            products.insert(
                id,
                Entry {
                    record: details.record,
                    history: details.history,
                },
            );
            expected = expected.next();
        }

        let access = AccessControl::from_parts(
            snapshot.admin,
            snapshot
                .authorizations
                .into_iter()
                .map(|auth| (auth.identity, auth.authorized)),
        );

        Ok(Self::from_parts(access, products, snapshot.last_id))
    }
}
