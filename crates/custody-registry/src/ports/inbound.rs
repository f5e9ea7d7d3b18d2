//! # Driving Port (API - Inbound)
//!
//! The operations the host exposes to callers. The caller identity is
//! supplied and authenticated by the host; it is never read from payloads.
//!
//! | Operation | Caller requirement |
//! |-----------|--------------------|
//! | `register` | authorized |
//! | `transfer` | current owner |
//! | `update_status` | current owner |
//! | `set_authorized` | admin |
//! | queries | anyone |

use crate::domain::{HistoryEntry, ProductDetails, RegistryError};
use async_trait::async_trait;
use shared_types::{Identity, ProductId};

/// Primary API of the custody registry.
///
/// Mutations are serialized and either commit fully or fail without side
/// effects. Queries observe only fully applied state.
#[async_trait]
pub trait CustodyRegistryApi: Send + Sync {
    /// Create a record for `manufacturer`; returns the new id.
    async fn register(
        &self,
        caller: Identity,
        name: &str,
        manufacturer: Identity,
    ) -> Result<ProductId, RegistryError>;

    /// Hand custody of `id` to `new_owner` with a new status.
    async fn transfer(
        &self,
        caller: Identity,
        id: ProductId,
        new_owner: Identity,
        status: &str,
    ) -> Result<(), RegistryError>;

    /// Change the status of `id` without moving custody.
    async fn update_status(
        &self,
        caller: Identity,
        id: ProductId,
        status: &str,
    ) -> Result<(), RegistryError>;

    /// Grant or revoke registration rights. Admin only.
    async fn set_authorized(
        &self,
        caller: Identity,
        identity: Identity,
        authorized: bool,
    ) -> Result<(), RegistryError>;

    /// The record and its full history.
    async fn get_details(&self, id: ProductId) -> Result<ProductDetails, RegistryError>;

    /// The history of `id`, oldest first.
    async fn history(&self, id: ProductId) -> Result<Vec<HistoryEntry>, RegistryError>;

    /// True iff a record with this id exists.
    async fn verify(&self, id: ProductId) -> bool;

    /// Number of records ever created.
    async fn total_count(&self) -> u64;

    /// True iff `identity` may register records.
    async fn is_authorized(&self, identity: Identity) -> bool;

    /// The admin fixed at initialisation.
    async fn admin(&self) -> Identity;
}
