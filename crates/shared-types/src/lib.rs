//! # Shared Types Crate
//!
//! Value types shared across the custody ledger workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Identity`, `ProductId`, `Timestamp` and the
//!   `LedgerEvent` notifications are defined once, here.
//! - **Host-Supplied Identity**: an `Identity` is opaque. The host platform
//!   authenticates callers; nothing in this workspace derives identity from
//!   payload contents.

pub mod entities;
pub mod errors;
pub mod events;

pub use entities::*;
pub use errors::*;
pub use events::*;
