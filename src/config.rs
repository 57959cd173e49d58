//! Configuration Module
//!
//! Handles loading the cache connection settings from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::ConnectionSettings;

/// Cache connection configuration.
///
/// Every field is optional. With nothing set the cache runs disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Timeouts and retry budget for the store connection
    pub connection: ConnectionSettings,
    /// Full connection URL, preferred over the discrete fields
    pub redis_url: Option<String>,
    /// `host` or `host:port`
    pub redis_addr: Option<String>,
    /// Password for AUTH, empty means none
    pub redis_password: String,
    /// Logical database index
    pub redis_db: i64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Connection URL (e.g. `redis://:secret@cache:6379/1`)
    /// - `REDIS_ADDR` - Address used when no URL is given
    /// - `REDIS_PASSWORD` - Password used with `REDIS_ADDR` (default: empty)
    /// - `REDIS_DB` - Database index used with `REDIS_ADDR` (default: 0)
    /// - `REDIS_CONNECT_TIMEOUT_MS` - Per-attempt connect timeout (default: 2000)
    /// - `REDIS_RESPONSE_TIMEOUT_MS` - Per-command response timeout (default: 1000)
    /// - `REDIS_MAX_RETRIES` - Reconnect attempts after the first (default: 1)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. A non-numeric `REDIS_DB` falls back to 0,
    /// and non-numeric or zero timeouts fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let millis = |name: &str| {
            non_empty(name)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
        };
        let defaults = ConnectionSettings::default();

        Self {
            connection: ConnectionSettings {
                connect_timeout: millis("REDIS_CONNECT_TIMEOUT_MS")
                    .unwrap_or(defaults.connect_timeout),
                response_timeout: millis("REDIS_RESPONSE_TIMEOUT_MS")
                    .unwrap_or(defaults.response_timeout),
                max_retries: non_empty("REDIS_MAX_RETRIES")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.max_retries),
            },
            redis_url: non_empty("REDIS_URL"),
            redis_addr: non_empty("REDIS_ADDR"),
            redis_password: non_empty("REDIS_PASSWORD").unwrap_or_default(),
            redis_db: non_empty("REDIS_DB")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Returns true if either connection path is configured.
    pub fn is_configured(&self) -> bool {
        self.redis_url.is_some() || self.redis_addr.is_some()
    }
}
