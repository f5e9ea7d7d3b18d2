//! # Event Sink Adapters
//!
//! Delivery targets for ledger notifications.
//!
//! - `BusEventSink` - forwards to a shared-bus `InMemoryEventBus`
//! - `InMemoryEventLog` - append-only journal, queryable per record
//! - `FanoutSink` - delivers to two sinks, first then second
//! - `NoOpSink` - discards everything

use crate::ports::outbound::EventSink;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, InMemoryEventBus};
use shared_types::{LedgerEvent, ProductId};
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// BUS SINK
// =============================================================================

/// Publishes every notification to the shared event bus.
#[derive(Clone)]
pub struct BusEventSink {
    bus: Arc<InMemoryEventBus>,
}

impl BusEventSink {
    /// Wrap a shared bus.
    #[must_use]
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }

    /// The underlying bus, for subscribing.
    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }
}

#[async_trait]
impl EventSink for BusEventSink {
    async fn emit(&self, event: LedgerEvent) {
        let receivers = self.bus.publish(event).await;
        debug!(receivers, "Notification forwarded to bus");
    }
}

// =============================================================================
// IN-MEMORY JOURNAL
// =============================================================================

/// Append-only notification journal.
///
/// Entries are never reordered or removed.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<LedgerEvent>>,
}

impl InMemoryEventLog {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification so far, oldest first.
    #[must_use]
    pub fn all(&self) -> Vec<LedgerEvent> {
        self.events.read().clone()
    }

    /// Notifications about one record, oldest first.
    #[must_use]
    pub fn for_product(&self, id: ProductId) -> Vec<LedgerEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.product_id() == id)
            .cloned()
            .collect()
    }

    /// Notifications recorded since position `offset`.
    #[must_use]
    pub fn since(&self, offset: usize) -> Vec<LedgerEvent> {
        self.events
            .read()
            .get(offset..)
            .map(<[LedgerEvent]>::to_vec)
            .unwrap_or_default()
    }

    /// Number of notifications recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventSink for InMemoryEventLog {
    async fn emit(&self, event: LedgerEvent) {
        self.events.write().push(event);
    }
}

// =============================================================================
// FAN-OUT AND NO-OP
// =============================================================================

/// Delivers each notification to `first`, then to `second`.
pub struct FanoutSink<A, B> {
    first: A,
    second: B,
}

impl<A: EventSink, B: EventSink> FanoutSink<A, B> {
    /// Combine two sinks.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

#[async_trait]
impl<A: EventSink, B: EventSink> EventSink for FanoutSink<A, B> {
    async fn emit(&self, event: LedgerEvent) {
        self.first.emit(event.clone()).await;
        self.second.emit(event).await;
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

#[async_trait]
impl EventSink for NoOpSink {
    async fn emit(&self, _event: LedgerEvent) {}
}
