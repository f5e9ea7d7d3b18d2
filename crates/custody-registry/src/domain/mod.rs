//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for the custody ledger.
//! NO I/O, NO async, NO logging.
//!
//! - Dependencies point INWARD only (service and adapters depend on this).
//! - Time and caller identity are passed in; nothing here reads a clock.

pub mod access;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod registry;
pub mod snapshot;

pub use access::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use registry::*;
pub use snapshot::*;
