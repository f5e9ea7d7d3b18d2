//! # Shared Bus - Notification Delivery for the Custody Ledger
//!
//! Carries `LedgerEvent` notifications from the registry to any number of
//! observers.
//!
//! ## Delivery Model
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Registry   │                    │   Observer   │
//! │   service    │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! - Events are broadcast in publication order; the registry publishes while
//!   holding its serialization lock, so bus order equals commit order.
//! - Subscribers only see events published after they subscribed.
//! - A subscriber that falls more than the channel capacity behind loses the
//!   oldest events (logged at debug level).

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use shared_types::LedgerEvent;
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
