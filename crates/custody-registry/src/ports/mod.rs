//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the custody ledger.
//!
//! - **Driving Port (Inbound)**: `CustodyRegistryApi`
//! - **Driven Ports (Outbound)**: `TimeSource`, `EventSink`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
