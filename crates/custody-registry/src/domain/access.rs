//! # Access Control
//!
//! The set of principals allowed to register records, plus the admin who
//! manages that set. The admin is fixed at initialisation and is always
//! authorized, whatever its own entry in the map says.

use crate::domain::errors::{ArgumentError, RegistryError, Requirement};
use shared_types::Identity;
use std::collections::BTreeMap;

/// Admin identity plus the authorization map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessControl {
    admin: Identity,
    authorized: BTreeMap<Identity, bool>,
}

impl AccessControl {
    /// Creates the access set with a fixed admin.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `admin` is the null identity.
    pub fn new(admin: Identity) -> Result<Self, RegistryError> {
        if admin.is_zero() {
            return Err(ArgumentError::NullAdmin.into());
        }
        Ok(Self {
            admin,
            authorized: BTreeMap::new(),
        })
    }

    /// Rebuilds the access set from stored entries, without caller checks.
    pub(crate) fn from_parts(
        admin: Identity,
        entries: impl IntoIterator<Item = (Identity, bool)>,
    ) -> Self {
        Self {
            admin,
            authorized: entries.into_iter().collect(),
        }
    }

    /// The admin identity.
    #[must_use]
    pub fn admin(&self) -> Identity {
        self.admin
    }

    /// True iff `identity` is the admin or has a `true` entry.
    #[must_use]
    pub fn is_authorized(&self, identity: Identity) -> bool {
        identity == self.admin || self.authorized.get(&identity).copied().unwrap_or(false)
    }

    /// Capability check for record registration.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `caller` is authorized.
    pub fn require_authorized(&self, caller: Identity) -> Result<(), RegistryError> {
        if self.is_authorized(caller) {
            Ok(())
        } else {
            Err(RegistryError::PermissionDenied {
                caller,
                required: Requirement::Authorized,
            })
        }
    }

    /// Grants or revokes registration rights. Admin only.
    ///
    /// Revocation does not touch records the identity already registered.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if `caller` is not the admin
    /// - `InvalidArgument` if `identity` is the null identity
    pub fn set_authorized(
        &mut self,
        caller: Identity,
        identity: Identity,
        authorized: bool,
    ) -> Result<(), RegistryError> {
        if caller != self.admin {
            return Err(RegistryError::PermissionDenied {
                caller,
                required: Requirement::Admin,
            });
        }
        if identity.is_zero() {
            return Err(ArgumentError::NullIdentity.into());
        }
        self.authorized.insert(identity, authorized);
        Ok(())
    }

    /// Stored entries in identity order.
    pub fn entries(&self) -> impl Iterator<Item = (Identity, bool)> + '_ {
        self.authorized.iter().map(|(id, flag)| (*id, *flag))
    }
}
