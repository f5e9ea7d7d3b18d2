//! # Driven Ports (SPI - Outbound)
//!
//! What the registry needs from its host:
//! - a logical clock (`TimeSource`)
//! - somewhere to deliver notifications (`EventSink`)

use async_trait::async_trait;
use shared_types::{LedgerEvent, Timestamp};
use std::sync::Arc;

/// Logical clock supplied by the host.
///
/// Successive calls must return non-decreasing values.
pub trait TimeSource: Send + Sync {
    /// Returns the current logical time.
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Receiver of ledger notifications.
///
/// Called once per notification, in emission order, while the registry's
/// serialization lock is held. Implementations must not call back into the
/// registry.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one notification.
    async fn emit(&self, event: LedgerEvent);
}

#[async_trait]
impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    async fn emit(&self, event: LedgerEvent) {
        (**self).emit(event).await;
    }
}
