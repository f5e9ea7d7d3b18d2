//! # Custody Service
//!
//! Async facade over the pure `Registry`. Owns the serialization lock, the
//! clock and the event sink.
//!
//! ## Ordering
//!
//! Every mutating call takes the write lock, reads the clock, applies the
//! domain operation and emits its notifications before releasing the lock.
//! Commit order, timestamp order and notification order therefore agree.
//! Queries take the read lock and never emit.

use crate::adapters::{InMemoryEventLog, LogicalClock};
use crate::config::RegistryConfig;
use crate::domain::{
    HistoryEntry, ProductDetails, Receipt, Registry, RegistryError, RegistrySnapshot,
    SnapshotError,
};
use crate::ports::inbound::CustodyRegistryApi;
use crate::ports::outbound::{EventSink, TimeSource};

use async_trait::async_trait;
use shared_types::{Identity, ProductId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Counters for the custody service.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStats {
    /// Records registered.
    pub registrations: u64,
    /// Custody transfers committed.
    pub transfers: u64,
    /// Status updates committed.
    pub status_updates: u64,
    /// Authorization changes committed.
    pub authorization_changes: u64,
    /// Mutating calls rejected with an error.
    pub rejected_calls: u64,
}

/// State guarded by the serialization lock.
struct State {
    registry: Registry,
    stats: ServiceStats,
}

/// The custody ledger service.
pub struct CustodyService<T: TimeSource, E: EventSink> {
    state: RwLock<State>,
    clock: T,
    sink: E,
}

impl<T: TimeSource, E: EventSink> CustodyService<T, E> {
    /// Wrap an existing registry.
    pub fn new(registry: Registry, clock: T, sink: E) -> Self {
        Self {
            state: RwLock::new(State {
                registry,
                stats: ServiceStats::default(),
            }),
            clock,
            sink,
        }
    }

    /// Build a fresh registry from configuration.
    ///
    /// The configured identities are authorized by the admin before the
    /// service is returned. No notifications are emitted for them.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a null admin or a null pre-authorized identity.
    pub fn from_config(config: &RegistryConfig, clock: T, sink: E) -> Result<Self, RegistryError> {
        let mut registry = Registry::new(config.admin)?;
        for identity in &config.authorized {
            registry.set_authorized(config.admin, *identity, true)?;
        }
        info!(
            admin = %config.admin,
            authorized = config.authorized.len(),
            "Custody registry initialised"
        );
        Ok(Self::new(registry, clock, sink))
    }

    /// Rebuild the service from a snapshot.
    ///
    /// # Errors
    ///
    /// `SnapshotError` if the snapshot breaks a registry invariant.
    pub fn from_snapshot(
        snapshot: RegistrySnapshot,
        clock: T,
        sink: E,
    ) -> Result<Self, SnapshotError> {
        let registry = Registry::restore(snapshot)?;
        info!(
            admin = %registry.admin(),
            records = registry.total_count(),
            "Custody registry restored from snapshot"
        );
        Ok(Self::new(registry, clock, sink))
    }

    /// Current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.state.read().await.stats
    }

    /// Capture the registry state.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.state.read().await.registry.snapshot()
    }

    /// The event sink, for callers that need to read captured notifications.
    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Emit a receipt's notifications in order. Caller holds the write lock.
    async fn emit_all<V>(&self, receipt: Receipt<V>) -> V {
        for event in receipt.events {
            debug!(kind = event.kind(), id = %event.product_id(), "Emitting notification");
            self.sink.emit(event).await;
        }
        receipt.value
    }
}

/// Record a rejected call and pass the error through.
fn rejected(stats: &mut ServiceStats, operation: &'static str, err: RegistryError) -> RegistryError {
    stats.rejected_calls += 1;
    warn!(operation, kind = %err.kind(), error = %err, "Call rejected");
    err
}

#[async_trait]
impl<T: TimeSource, E: EventSink> CustodyRegistryApi for CustodyService<T, E> {
    #[instrument(skip(self, name), fields(caller = %caller, manufacturer = %manufacturer))]
    async fn register(
        &self,
        caller: Identity,
        name: &str,
        manufacturer: Identity,
    ) -> Result<ProductId, RegistryError> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let receipt = match state.registry.register(caller, name, manufacturer, now) {
            Ok(receipt) => receipt,
            Err(err) => return Err(rejected(&mut state.stats, "register", err)),
        };
        state.stats.registrations += 1;
        info!(id = %receipt.value, product = name, timestamp = now, "Record registered");
        Ok(self.emit_all(receipt).await)
    }

    #[instrument(skip(self, status), fields(caller = %caller, id = %id, new_owner = %new_owner))]
    async fn transfer(
        &self,
        caller: Identity,
        id: ProductId,
        new_owner: Identity,
        status: &str,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let receipt = match state.registry.transfer(caller, id, new_owner, status, now) {
            Ok(receipt) => receipt,
            Err(err) => return Err(rejected(&mut state.stats, "transfer", err)),
        };
        state.stats.transfers += 1;
        info!(status, timestamp = now, "Custody transferred");
        self.emit_all(receipt).await;
        Ok(())
    }

    #[instrument(skip(self, status), fields(caller = %caller, id = %id))]
    async fn update_status(
        &self,
        caller: Identity,
        id: ProductId,
        status: &str,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let receipt = match state.registry.update_status(caller, id, status, now) {
            Ok(receipt) => receipt,
            Err(err) => return Err(rejected(&mut state.stats, "update_status", err)),
        };
        state.stats.status_updates += 1;
        info!(status, timestamp = now, "Status updated");
        self.emit_all(receipt).await;
        Ok(())
    }

    #[instrument(skip(self), fields(caller = %caller, identity = %identity))]
    async fn set_authorized(
        &self,
        caller: Identity,
        identity: Identity,
        authorized: bool,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;
        if let Err(err) = state.registry.set_authorized(caller, identity, authorized) {
            return Err(rejected(&mut state.stats, "set_authorized", err));
        }
        state.stats.authorization_changes += 1;
        info!(authorized, "Authorization changed");
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_details(&self, id: ProductId) -> Result<ProductDetails, RegistryError> {
        let details = self.state.read().await.registry.details(id);
        debug!(found = details.is_ok(), "Details lookup");
        details
    }

    async fn history(&self, id: ProductId) -> Result<Vec<HistoryEntry>, RegistryError> {
        self.state
            .read()
            .await
            .registry
            .history(id)
            .map(<[HistoryEntry]>::to_vec)
    }

    async fn verify(&self, id: ProductId) -> bool {
        self.state.read().await.registry.verify(id)
    }

    async fn total_count(&self) -> u64 {
        self.state.read().await.registry.total_count()
    }

    async fn is_authorized(&self, identity: Identity) -> bool {
        self.state.read().await.registry.is_authorized(identity)
    }

    async fn admin(&self) -> Identity {
        self.state.read().await.registry.admin()
    }
}

/// In-memory service with a logical clock and a notification journal.
///
/// Returns the service together with a handle to its journal.
///
/// # Errors
///
/// `InvalidArgument` if `admin` is the null identity.
pub fn create_in_memory_service(
    admin: Identity,
) -> Result<
    (
        CustodyService<LogicalClock, Arc<InMemoryEventLog>>,
        Arc<InMemoryEventLog>,
    ),
    RegistryError,
> {
    let log = Arc::new(InMemoryEventLog::new());
    let service = CustodyService::new(Registry::new(admin)?, LogicalClock::new(), log.clone());
    Ok((service, log))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ManualClock;
    use crate::domain::{ErrorKind, MANUFACTURED_STATUS};
    use shared_types::LedgerEvent;

    const ADMIN: Identity = Identity::from_low_byte(0xAD);
    const MAKER: Identity = Identity::from_low_byte(0xA0);
    const CARRIER: Identity = Identity::from_low_byte(0xB0);
    const STRANGER: Identity = Identity::from_low_byte(0xC0);

    #[tokio::test]
    async fn test_register_emits_in_order() {
        let (service, log) = create_in_memory_service(ADMIN).unwrap();
        service.set_authorized(ADMIN, MAKER, true).await.unwrap();

        let id = service.register(MAKER, "Widget", MAKER).await.unwrap();
        assert_eq!(id, ProductId(1));

        assert_eq!(
            log.all(),
            vec![
                LedgerEvent::Registered {
                    id,
                    manufacturer: MAKER,
                    name: "Widget".into(),
                },
                LedgerEvent::StatusChanged {
                    id,
                    status: MANUFACTURED_STATUS.into(),
                    timestamp: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_calls_emit_nothing() {
        let (service, log) = create_in_memory_service(ADMIN).unwrap();

        let err = service.register(STRANGER, "Widget", STRANGER).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err = service
            .transfer(ADMIN, ProductId(1), CARRIER, "InTransit")
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::NotFound(ProductId(1)));

        assert!(log.is_empty());
        assert_eq!(service.total_count().await, 0);
        assert_eq!(service.stats().await.rejected_calls, 2);
    }

    #[tokio::test]
    async fn test_timestamps_follow_clock() {
        let clock = Arc::new(ManualClock::new(100));
        let log = Arc::new(InMemoryEventLog::new());
        let service = CustodyService::new(Registry::new(ADMIN).unwrap(), clock.clone(), log);

        let id = service.register(ADMIN, "Widget", MAKER).await.unwrap();
        clock.advance(50);
        service.transfer(MAKER, id, CARRIER, "InTransit").await.unwrap();

        let history = service.history(id).await.unwrap();
        assert_eq!(history[0].timestamp, 100);
        assert_eq!(history[1].timestamp, 150);
        assert_eq!(service.get_details(id).await.unwrap().record.creation_time, 100);
    }

    #[tokio::test]
    async fn test_stats_count_committed_operations() {
        let (service, _log) = create_in_memory_service(ADMIN).unwrap();
        service.set_authorized(ADMIN, MAKER, true).await.unwrap();
        let id = service.register(MAKER, "Widget", MAKER).await.unwrap();
        service.transfer(MAKER, id, CARRIER, "InTransit").await.unwrap();
        service.update_status(CARRIER, id, "Delivered").await.unwrap();

        assert_eq!(
            service.stats().await,
            ServiceStats {
                registrations: 1,
                transfers: 1,
                status_updates: 1,
                authorization_changes: 1,
                rejected_calls: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_from_config_preauthorizes() {
        let config = RegistryConfig {
            admin: ADMIN,
            authorized: vec![MAKER],
            ..RegistryConfig::default()
        };
        let service =
            CustodyService::from_config(&config, LogicalClock::new(), crate::adapters::NoOpSink)
                .unwrap();

        assert!(service.is_authorized(MAKER).await);
        assert!(!service.is_authorized(CARRIER).await);
        assert_eq!(service.admin().await, ADMIN);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_through_service() {
        let (service, _log) = create_in_memory_service(ADMIN).unwrap();
        let id = service.register(ADMIN, "Widget", MAKER).await.unwrap();
        service.transfer(MAKER, id, CARRIER, "InTransit").await.unwrap();

        let snapshot = service.snapshot().await;
        let restored = CustodyService::from_snapshot(
            snapshot.clone(),
            LogicalClock::starting_at(10),
            crate::adapters::NoOpSink,
        )
        .unwrap();

        assert_eq!(restored.snapshot().await, snapshot);
        assert!(restored.verify(id).await);
        assert_eq!(restored.register(ADMIN, "Gadget", MAKER).await.unwrap(), ProductId(2));
    }

    #[tokio::test]
    async fn test_restore_under_slower_clock_stays_restorable() {
        let clock = Arc::new(ManualClock::new(1000));
        let log = Arc::new(InMemoryEventLog::new());
        let service = CustodyService::new(Registry::new(ADMIN).unwrap(), clock, log);
        let id = service.register(ADMIN, "Widget", MAKER).await.unwrap();

        let restored = CustodyService::from_snapshot(
            service.snapshot().await,
            Arc::new(ManualClock::new(900)),
            crate::adapters::NoOpSink,
        )
        .unwrap();
        restored.transfer(MAKER, id, CARRIER, "InTransit").await.unwrap();

        let history = restored.history(id).await.unwrap();
        assert_eq!(history[1].timestamp, 1000);
        assert!(CustodyService::from_snapshot(
            restored.snapshot().await,
            LogicalClock::new(),
            crate::adapters::NoOpSink,
        )
        .is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_get_distinct_ids() {
        let (service, log) = create_in_memory_service(ADMIN).unwrap();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .register(ADMIN, &format!("item-{i}"), MAKER)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().get());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
        assert_eq!(service.total_count().await, 16);

        // Each registration's two notifications stay adjacent.
        let events = log.all();
        for pair in events.chunks(2) {
            assert_eq!(pair[0].product_id(), pair[1].product_id());
            assert_eq!(pair[0].kind(), "Registered");
        }
    }
}
