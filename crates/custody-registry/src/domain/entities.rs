//! # Core Domain Entities
//!
//! `Record` is the authoritative current state of one tracked item.
//! `HistoryEntry` is one immutable audit event in its custody log.

use serde::{Deserialize, Serialize};
use shared_types::{Identity, ProductId, Timestamp};

/// Status given to every record at creation.
pub const MANUFACTURED_STATUS: &str = "Manufactured";

// =============================================================================
// RECORD
// =============================================================================

/// Current state of a tracked item.
///
/// `id`, `name`, `manufacturer` and `creation_time` never change after
/// creation. `current_owner` changes only through a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Sequential id, starting at 1.
    pub id: ProductId,
    /// Descriptive name (non-empty).
    pub name: String,
    /// Principal that originated the record.
    pub manufacturer: Identity,
    /// Principal currently holding custody.
    pub current_owner: Identity,
    /// Free-form lifecycle stage, e.g. "InTransit".
    pub current_status: String,
    /// Logical time of creation.
    pub creation_time: Timestamp,
}

// =============================================================================
// HISTORY ENTRY
// =============================================================================

/// One audit-log event for a record.
///
/// `from` is `None` only for the creation entry. Status updates without a
/// change of custody are recorded with `from == to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Previous owner (`None` for the creation entry).
    pub from: Option<Identity>,
    /// Owner after the event.
    pub to: Identity,
    /// Logical time of the event.
    pub timestamp: Timestamp,
    /// Status associated with the event.
    pub status: String,
}

impl HistoryEntry {
    /// The entry appended when a record is created.
    #[must_use]
    pub fn creation(manufacturer: Identity, timestamp: Timestamp) -> Self {
        Self {
            from: None,
            to: manufacturer,
            timestamp,
            status: MANUFACTURED_STATUS.to_string(),
        }
    }

    /// An entry for a change of custody, or a status update when `from == to`.
    #[must_use]
    pub fn custody(from: Identity, to: Identity, status: String, timestamp: Timestamp) -> Self {
        Self {
            from: Some(from),
            to,
            timestamp,
            status,
        }
    }

    /// Returns true if this is the creation entry.
    #[must_use]
    pub fn is_creation(&self) -> bool {
        self.from.is_none()
    }

    /// Returns true if this entry records a status update without a custody change.
    #[must_use]
    pub fn is_status_update(&self) -> bool {
        self.from == Some(self.to)
    }
}

// =============================================================================
// PRODUCT DETAILS
// =============================================================================

/// A record together with its full custody history.
///
/// The history is never empty and is in chronological order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    /// Current state.
    pub record: Record,
    /// Audit log, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl ProductDetails {
    /// The most recent history entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_entry() {
        let maker = Identity::from_low_byte(1);
        let entry = HistoryEntry::creation(maker, 42);
        assert!(entry.is_creation());
        assert!(!entry.is_status_update());
        assert_eq!(entry.to, maker);
        assert_eq!(entry.status, MANUFACTURED_STATUS);
        assert_eq!(entry.timestamp, 42);
    }

    #[test]
    fn test_status_update_entry() {
        let owner = Identity::from_low_byte(2);
        let entry = HistoryEntry::custody(owner, owner, "Delivered".into(), 5);
        assert!(entry.is_status_update());
        assert!(!entry.is_creation());
    }

    #[test]
    fn test_transfer_entry_is_not_status_update() {
        let entry = HistoryEntry::custody(
            Identity::from_low_byte(1),
            Identity::from_low_byte(2),
            "InTransit".into(),
            5,
        );
        assert!(!entry.is_status_update());
    }
}
