//! # Product Registry
//!
//! The custody state machine. Owns the record map, the per-record history,
//! the access set and the id counter.
//!
//! Every mutating operation validates all preconditions first and only
//! then writes, so a failed call leaves the registry untouched. Committed
//! operations return their notifications in emission order inside a
//! [`Receipt`].
//!
//! Logical time never runs backwards inside one registry: a `now` earlier
//! than the latest committed timestamp is raised to it.
//!
//! ```text
//!  [nonexistent] ──register──→ [existing] ──transfer / update_status──→ [existing]
//! ```

use crate::domain::access::AccessControl;
use crate::domain::entities::{HistoryEntry, ProductDetails, Record, MANUFACTURED_STATUS};
use crate::domain::errors::{ArgumentError, RegistryError, Requirement};
use shared_types::{Identity, LedgerEvent, ProductId, Timestamp};
use std::collections::BTreeMap;

/// Outcome of a committed mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt<T> {
    /// The operation's return value.
    pub value: T,
    /// Notifications, in the order they must be emitted.
    pub events: Vec<LedgerEvent>,
}

/// A record plus its audit log, stored together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    pub(crate) record: Record,
    pub(crate) history: Vec<HistoryEntry>,
}

/// The product registry.
///
/// Constructed once with a fixed admin. Holds no ambient state; callers
/// supply the caller identity and the logical time of every mutation.
#[derive(Clone, Debug)]
pub struct Registry {
    access: AccessControl,
    products: BTreeMap<ProductId, Entry>,
    /// Last id handed out (0 if none).
    last_id: u64,
    /// Latest timestamp written to any history.
    last_timestamp: Timestamp,
}

impl Registry {
    /// Creates an empty registry administered by `admin`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `admin` is the null identity.
    pub fn new(admin: Identity) -> Result<Self, RegistryError> {
        Ok(Self {
            access: AccessControl::new(admin)?,
            products: BTreeMap::new(),
            last_id: 0,
            last_timestamp: 0,
        })
    }

    pub(crate) fn from_parts(
        access: AccessControl,
        products: BTreeMap<ProductId, Entry>,
        last_id: u64,
    ) -> Self {
        let last_timestamp = products
            .values()
            .flat_map(|entry| entry.history.iter().map(|h| h.timestamp))
            .max()
            .unwrap_or(0);
        Self {
            access,
            products,
            last_id,
            last_timestamp,
        }
    }

    /// Clamp `now` to the latest committed timestamp.
    fn effective_time(&self, now: Timestamp) -> Timestamp {
        now.max(self.last_timestamp)
    }

    pub(crate) fn access(&self) -> &AccessControl {
        &self.access
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.products.values()
    }

    // =========================================================================
    // ACCESS CONTROL
    // =========================================================================

    /// The admin fixed at initialisation.
    #[must_use]
    pub fn admin(&self) -> Identity {
        self.access.admin()
    }

    /// True iff `identity` may register records.
    #[must_use]
    pub fn is_authorized(&self, identity: Identity) -> bool {
        self.access.is_authorized(identity)
    }

    /// Grants or revokes registration rights. Admin only.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if `caller` is not the admin
    /// - `InvalidArgument` if `identity` is the null identity
    pub fn set_authorized(
        &mut self,
        caller: Identity,
        identity: Identity,
        authorized: bool,
    ) -> Result<(), RegistryError> {
        self.access.set_authorized(caller, identity, authorized)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Creates a new record owned by `manufacturer`.
    ///
    /// The id is allocated only on success, so rejected calls never consume
    /// one. Emits `Registered` then `StatusChanged`.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if `caller` is not authorized
    /// - `InvalidArgument` for an empty name or null manufacturer
    pub fn register(
        &mut self,
        caller: Identity,
        name: &str,
        manufacturer: Identity,
        now: Timestamp,
    ) -> Result<Receipt<ProductId>, RegistryError> {
        self.access.require_authorized(caller)?;
        if name.is_empty() {
            return Err(ArgumentError::EmptyName.into());
        }
        if manufacturer.is_zero() {
            return Err(ArgumentError::NullManufacturer.into());
        }

        let now = self.effective_time(now);
        let id = ProductId(self.last_id + 1);
        let record = Record {
            id,
            name: name.to_string(),
            manufacturer,
            current_owner: manufacturer,
            current_status: MANUFACTURED_STATUS.to_string(),
            creation_time: now,
        };
        let history = vec![HistoryEntry::creation(manufacturer, now)];

        self.last_id = id.get();
        self.last_timestamp = now;
        self.products.insert(id, Entry { record, history });

        Ok(Receipt {
            value: id,
            events: vec![
                LedgerEvent::Registered {
                    id,
                    manufacturer,
                    name: name.to_string(),
                },
                LedgerEvent::StatusChanged {
                    id,
                    status: MANUFACTURED_STATUS.to_string(),
                    timestamp: now,
                },
            ],
        })
    }

    /// Hands custody of record `id` to `new_owner` with a new status.
    ///
    /// Emits `Transferred` then `StatusChanged`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `id` was never registered
    /// - `PermissionDenied` if `caller` is not the current owner
    /// - `InvalidArgument` for a null or unchanged owner, or an empty status
    pub fn transfer(
        &mut self,
        caller: Identity,
        id: ProductId,
        new_owner: Identity,
        status: &str,
        now: Timestamp,
    ) -> Result<Receipt<()>, RegistryError> {
        let now = self.effective_time(now);
        let entry = self.owned_entry_mut(caller, id)?;
        let old_owner = entry.record.current_owner;
        if new_owner.is_zero() {
            return Err(ArgumentError::NullOwner.into());
        }
        if new_owner == old_owner {
            return Err(ArgumentError::SameOwner.into());
        }
        if status.is_empty() {
            return Err(ArgumentError::EmptyStatus.into());
        }

        entry.record.current_owner = new_owner;
        entry.record.current_status = status.to_string();
        entry.history.push(HistoryEntry::custody(
            old_owner,
            new_owner,
            status.to_string(),
            now,
        ));
        self.last_timestamp = now;

        Ok(Receipt {
            value: (),
            events: vec![
                LedgerEvent::Transferred {
                    id,
                    from: old_owner,
                    to: new_owner,
                    timestamp: now,
                },
                LedgerEvent::StatusChanged {
                    id,
                    status: status.to_string(),
                    timestamp: now,
                },
            ],
        })
    }

    /// Changes the status of record `id` without moving custody.
    ///
    /// Appends a self-transfer entry (`from == to == owner`). Emits
    /// `StatusChanged`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `id` was never registered
    /// - `PermissionDenied` if `caller` is not the current owner
    /// - `InvalidArgument` for an empty status
    pub fn update_status(
        &mut self,
        caller: Identity,
        id: ProductId,
        status: &str,
        now: Timestamp,
    ) -> Result<Receipt<()>, RegistryError> {
        let now = self.effective_time(now);
        let entry = self.owned_entry_mut(caller, id)?;
        if status.is_empty() {
            return Err(ArgumentError::EmptyStatus.into());
        }

        let owner = entry.record.current_owner;
        entry.record.current_status = status.to_string();
        entry
            .history
            .push(HistoryEntry::custody(owner, owner, status.to_string(), now));
        self.last_timestamp = now;

        Ok(Receipt {
            value: (),
            events: vec![LedgerEvent::StatusChanged {
                id,
                status: status.to_string(),
                timestamp: now,
            }],
        })
    }

    /// Looks up `id` and checks the caller holds custody.
    fn owned_entry_mut(
        &mut self,
        caller: Identity,
        id: ProductId,
    ) -> Result<&mut Entry, RegistryError> {
        let entry = self
            .products
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        let owner = entry.record.current_owner;
        if caller != owner {
            return Err(RegistryError::PermissionDenied {
                caller,
                required: Requirement::CurrentOwner(owner),
            });
        }
        Ok(entry)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// The record and its full history.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` was never registered.
    pub fn details(&self, id: ProductId) -> Result<ProductDetails, RegistryError> {
        self.products
            .get(&id)
            .map(|entry| ProductDetails {
                record: entry.record.clone(),
                history: entry.history.clone(),
            })
            .ok_or(RegistryError::NotFound(id))
    }

    /// Borrow the current record, if it exists.
    #[must_use]
    pub fn record(&self, id: ProductId) -> Option<&Record> {
        self.products.get(&id).map(|entry| &entry.record)
    }

    /// Borrow the history of record `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` was never registered.
    pub fn history(&self, id: ProductId) -> Result<&[HistoryEntry], RegistryError> {
        self.products
            .get(&id)
            .map(|entry| entry.history.as_slice())
            .ok_or(RegistryError::NotFound(id))
    }

    /// True iff a record with this id exists. Never fails.
    #[must_use]
    pub fn verify(&self, id: ProductId) -> bool {
        self.products.contains_key(&id)
    }

    /// Number of records ever created (the last assigned id).
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.last_id
    }

    /// Latest timestamp recorded in any history (0 when empty).
    #[must_use]
    pub fn last_timestamp(&self) -> Timestamp {
        self.last_timestamp
    }
}

// =============================================================================
// TESTS
// =============================================================================
