//! Registry configuration from environment variables.

use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_types::{Identity, IdentityParseError};
use std::env;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds something that is not an identity.
    #[error("{var} is not a valid identity: {source}")]
    InvalidIdentity {
        /// Variable name.
        var: &'static str,
        /// Parse failure.
        #[source]
        source: IdentityParseError,
    },

    /// A variable holds something that is not a number.
    #[error("{var} is not a valid number: {value:?}")]
    InvalidNumber {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// No admin configured, or the admin is the null identity.
    #[error("admin identity is missing or null")]
    NullAdmin,

    /// The pre-authorized list contains the null identity.
    #[error("pre-authorized identity at position {index} is null")]
    NullAuthorized {
        /// Position in the list.
        index: usize,
    },

    /// Event bus capacity must be positive.
    #[error("event capacity must be at least 1")]
    ZeroCapacity,
}

/// Configuration for a custody registry instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Admin fixed at initialisation.
    pub admin: Identity,

    /// Identities authorized by the admin at start-up.
    pub authorized: Vec<Identity>,

    /// Broadcast capacity of the notification bus.
    pub event_capacity: usize,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            admin: Identity::ZERO,
            authorized: Vec::new(),
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl RegistryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CUSTODY_ADMIN`: Admin identity, hex (no default; see `validate`)
    /// - `CUSTODY_AUTHORIZED`: Comma separated identities to pre-authorize
    /// - `CUSTODY_EVENT_CAPACITY`: Bus capacity (default: 1000)
    /// - `CUSTODY_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CUSTODY_JSON_LOGS`: Enable JSON logs (default: false)
    ///
    /// # Errors
    ///
    /// `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// `ConfigError` if a variable is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let admin = match lookup("CUSTODY_ADMIN") {
            Some(value) => parse_identity("CUSTODY_ADMIN", &value)?,
            None => defaults.admin,
        };

        let authorized = match lookup("CUSTODY_AUTHORIZED") {
            Some(value) => parse_identity_list("CUSTODY_AUTHORIZED", &value)?,
            None => defaults.authorized,
        };

        let event_capacity = match lookup("CUSTODY_EVENT_CAPACITY") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "CUSTODY_EVENT_CAPACITY",
                    value,
                })?,
            None => defaults.event_capacity,
        };

        Ok(Self {
            admin,
            authorized,
            event_capacity,
            log_level: lookup("CUSTODY_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: lookup("CUSTODY_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        })
    }

    /// Check the configuration can initialise a registry.
    ///
    /// # Errors
    ///
    /// - `NullAdmin` if no usable admin is set
    /// - `NullAuthorized` if a pre-authorized identity is null
    /// - `ZeroCapacity` if the bus capacity is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.is_zero() {
            return Err(ConfigError::NullAdmin);
        }
        if let Some(index) = self.authorized.iter().position(Identity::is_zero) {
            return Err(ConfigError::NullAuthorized { index });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

fn parse_identity(var: &'static str, value: &str) -> Result<Identity, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidIdentity { var, source })
}

/// Parse a comma separated list, ignoring blank items.
pub fn parse_identity_list(var: &'static str, value: &str) -> Result<Vec<Identity>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_identity(var, item))
        .collect()
}
