//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports.
//!
//! - `clock` - `TimeSource` implementations
//! - `event_sink` - `EventSink` implementations (bus, journal, fan-out)

pub mod clock;
pub mod event_sink;

pub use clock::{LogicalClock, ManualClock, SystemTimeSource};
pub use event_sink::{BusEventSink, FanoutSink, InMemoryEventLog, NoOpSink};
