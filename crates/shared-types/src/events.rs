//! # Ledger Notifications
//!
//! Notifications emitted synchronously by every committed state change.
//! Observers consume them as an append-only log, in emission order.
//!
//! | Operation | Notifications (in order) |
//! |-----------|--------------------------|
//! | register | `Registered`, `StatusChanged` |
//! | transfer | `Transferred`, `StatusChanged` |
//! | update status | `StatusChanged` |

use crate::entities::{Identity, ProductId, Timestamp};
use serde::{Deserialize, Serialize};

/// A single ledger notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A new record was created.
    Registered {
        /// Id assigned to the record.
        id: ProductId,
        /// Originating principal.
        manufacturer: Identity,
        /// Descriptive name of the item.
        name: String,
    },

    /// Custody moved from one principal to another.
    Transferred {
        /// The record that changed hands.
        id: ProductId,
        /// Previous owner.
        from: Identity,
        /// New owner.
        to: Identity,
        /// Logical time of the transfer.
        timestamp: Timestamp,
    },

    /// The record's status text changed (also emitted on creation and transfer).
    StatusChanged {
        /// The record whose status changed.
        id: ProductId,
        /// New status text.
        status: String,
        /// Logical time of the change.
        timestamp: Timestamp,
    },
}

impl LedgerEvent {
    /// The record this notification concerns.
    #[must_use]
    pub fn product_id(&self) -> ProductId {
        match self {
            Self::Registered { id, .. }
            | Self::Transferred { id, .. }
            | Self::StatusChanged { id, .. } => *id,
        }
    }

    /// Short name of the notification kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "Registered",
            Self::Transferred { .. } => "Transferred",
            Self::StatusChanged { .. } => "StatusChanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_accessor() {
        let event = LedgerEvent::Transferred {
            id: ProductId(4),
            from: Identity::from_low_byte(1),
            to: Identity::from_low_byte(2),
            timestamp: 10,
        };
        assert_eq!(event.product_id(), ProductId(4));
        assert_eq!(event.kind(), "Transferred");
    }

    #[test]
    fn test_json_shape() {
        let event = LedgerEvent::StatusChanged {
            id: ProductId(1),
            status: "Manufactured".to_string(),
            timestamp: 5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "status_changed");
        assert_eq!(json["id"], 1);
        assert_eq!(json["status"], "Manufactured");
    }
}
