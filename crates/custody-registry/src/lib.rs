//! # Custody Registry - Product Custody Ledger
//!
//! Registry of physical items with an append-only custody history.
//!
//! ## Purpose
//!
//! Authorized principals register items. The current owner of an item hands
//! custody to another principal or updates its status. Every change is
//! appended to the item's history and announced to subscribers. Anyone may
//! read records and histories.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Ids are sequential from 1, allocated only on success | `domain/registry.rs` - `Registry::register()` |
//! | History never shrinks or reorders | `domain/registry.rs` - append-only `Entry::history` |
//! | First history entry is the creation entry | `domain/invariants.rs` - `check_creation_entry()` |
//! | Each entry starts where the previous one ended | `domain/invariants.rs` - `check_custody_chain()` |
//! | Last entry matches current owner and status | `domain/invariants.rs` - `check_head_matches_record()` |
//! | Admin is always authorized | `domain/access.rs` - `AccessControl::is_authorized()` |
//! | Failed calls change nothing and emit nothing | checks precede mutation in every operation |
//!
//! ## Authorization Matrix
//!
//! | Operation | Required Caller | Enforcement |
//! |-----------|-----------------|-------------|
//! | `set_authorized` | Admin | `AccessControl::set_authorized()` |
//! | `register` | Authorized (or admin) | `AccessControl::require_authorized()` |
//! | `transfer` | Current owner | `Registry::owned_entry_mut()` |
//! | `update_status` | Current owner | `Registry::owned_entry_mut()` |
//! | queries | Anyone | - |
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose | Adapters |
//! |------|---------|----------|
//! | `TimeSource` | Timestamps for history entries | `SystemTimeSource`, `LogicalClock`, `ManualClock` |
//! | `EventSink` | Notification delivery | `BusEventSink`, `InMemoryEventLog`, `FanoutSink`, `NoOpSink` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use custody_registry::prelude::*;
//!
//! let (service, log) = create_in_memory_service(admin)?;
//! service.set_authorized(admin, maker, true).await?;
//!
//! let id = service.register(maker, "Widget", maker).await?;
//! service.transfer(maker, id, carrier, "InTransit").await?;
//!
//! let details = service.get_details(id).await?;
//! assert_eq!(details.history.len(), 2);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Shared value types
    pub use shared_types::{Identity, LedgerEvent, ProductId, Timestamp};

    // Domain entities
    pub use crate::domain::entities::{HistoryEntry, ProductDetails, Record, MANUFACTURED_STATUS};

    // Domain services
    pub use crate::domain::access::AccessControl;
    pub use crate::domain::registry::{Receipt, Registry};
    pub use crate::domain::snapshot::{AuthorizationRecord, RegistrySnapshot, SNAPSHOT_VERSION};

    // Invariants
    pub use crate::domain::invariants::{
        check_record_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Errors
    pub use crate::domain::errors::{
        ArgumentError, ErrorKind, RegistryError, Requirement, SnapshotError,
    };

    // Ports
    pub use crate::ports::inbound::CustodyRegistryApi;
    pub use crate::ports::outbound::{EventSink, TimeSource};

    // Adapters
    pub use crate::adapters::{
        BusEventSink, FanoutSink, InMemoryEventLog, LogicalClock, ManualClock, NoOpSink,
        SystemTimeSource,
    };

    // Configuration
    pub use crate::config::{ConfigError, RegistryConfig};

    // Service
    pub use crate::service::{create_in_memory_service, CustodyService, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component name used in logs.
pub const COMPONENT_NAME: &str = "Custody Registry";

// =============================================================================
// TESTS
// =============================================================================
