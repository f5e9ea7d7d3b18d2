//! # Clock Adapters
//!
//! `TimeSource` implementations. All of them are non-decreasing.

use crate::ports::outbound::TimeSource;
use shared_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// Wall-clock seconds since the unix epoch, clamped so it never goes back.
#[derive(Debug, Default)]
pub struct SystemTimeSource {
    last: AtomicU64,
}

impl SystemTimeSource {
    /// Create a new system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a system clock that never reads earlier than `floor`.
    ///
    /// Seed with the latest persisted timestamp so a wall clock that moved
    /// back between runs cannot produce older history entries.
    #[must_use]
    pub fn starting_at(floor: Timestamp) -> Self {
        Self {
            last: AtomicU64::new(floor),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        let wall = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        previous.max(wall)
    }
}

/// Counter clock: every reading is one tick after the previous one.
#[derive(Debug, Default)]
pub struct LogicalClock {
    ticks: AtomicU64,
}

impl LogicalClock {
    /// Create a clock whose first reading is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock whose first reading is `start + 1`.
    #[must_use]
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            ticks: AtomicU64::new(start),
        }
    }
}

impl TimeSource for LogicalClock {
    fn now(&self) -> Timestamp {
        self.ticks.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Clock driven by hand, for tests and replay.
///
/// `set` never moves time backwards.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `initial`.
    #[must_use]
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Move time forward by `delta`.
    pub fn advance(&self, delta: u64) {
        self.time.fetch_add(delta, Ordering::SeqCst);
    }

    /// Move time forward to `time` (no-op if already later).
    pub fn set(&self, time: Timestamp) {
        self.time.fetch_max(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}
