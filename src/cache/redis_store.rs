//! Redis Store
//!
//! Store client backed by a Redis server. Connection options are resolved at
//! setup time; the connection itself is opened on first use and shared
//! afterwards through an auto-reconnecting connection manager.
//!
//! Connecting and every command are bounded by [`ConnectionSettings`], so an
//! unreachable server turns into a `CacheError::Connectivity` within seconds.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{
    AsyncCommands, ConnectionAddr, ConnectionInfo, ErrorKind, IntoConnectionInfo,
    RedisConnectionInfo,
};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::Store;
use crate::error::{CacheError, Result};

// == Public Constants ==
/// Port used when an address carries none
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Largest PSETEX value sent to Redis. Redis rejects expiries that overflow
/// a signed 64-bit unix-millisecond timestamp once added to the current time.
pub const MAX_EXPIRY_MILLIS: u64 = i64::MAX as u64 / 2;

/// First delay between reconnect attempts, in milliseconds
const RETRY_FACTOR_MS: u64 = 100;
/// Cap on the delay between reconnect attempts
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

// == Connection Settings ==
/// Limits applied to the shared Redis connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Time allowed for a single connect attempt
    pub connect_timeout: Duration,
    /// Time allowed for a single command round trip
    pub response_timeout: Duration,
    /// Reconnect attempts after the first one fails
    pub max_retries: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            response_timeout: Duration::from_secs(1),
            max_retries: 1,
        }
    }
}

impl ConnectionSettings {
    fn manager_config(&self) -> ConnectionManagerConfig {
        ConnectionManagerConfig::new()
            .set_connection_timeout(self.connect_timeout)
            .set_response_timeout(self.response_timeout)
            .set_number_of_retries(self.max_retries)
            .set_exponent_base(2)
            .set_factor(RETRY_FACTOR_MS)
            .set_max_delay(MAX_RETRY_DELAY.as_millis() as u64)
    }

    /// Upper bound on opening the connection, retries included.
    pub fn connect_budget(&self) -> Duration {
        let attempts = u32::try_from(self.max_retries)
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        (self.connect_timeout + MAX_RETRY_DELAY).saturating_mul(attempts)
    }
}

// == Redis Store ==
/// Store client for a single Redis endpoint.
pub struct RedisStore {
    info: ConnectionInfo,
    settings: ConnectionSettings,
    manager: OnceCell<ConnectionManager>,
}

impl RedisStore {
    // == From URL ==
    /// Parses a connection URL such as `redis://:password@host:6379/0`.
    ///
    /// Fails with `CacheError::Configuration` when the URL is malformed or
    /// uses a scheme Redis does not understand.
    pub fn from_url(url: &str) -> Result<Self> {
        let info = url
            .into_connection_info()
            .map_err(|e| CacheError::Configuration(e.to_string()))?;

        Ok(Self::with_info(info))
    }

    // == From Parameters ==
    /// Builds connection options from discrete parameters. Never fails and
    /// never touches the network.
    ///
    /// # Arguments
    /// * `addr` - `host` or `host:port`
    /// * `password` - AUTH password, empty for none
    /// * `db` - Logical database index
    pub fn from_params(addr: &str, password: &str, db: i64) -> Self {
        let (host, port) = split_addr(addr);

        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host, port),
            redis: RedisConnectionInfo {
                db,
                password: (!password.is_empty()).then(|| password.to_string()),
                ..Default::default()
            },
        };

        Self::with_info(info)
    }

    /// Replaces the default connection limits.
    pub fn with_settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }

    fn with_info(info: ConnectionInfo) -> Self {
        Self {
            info,
            settings: ConnectionSettings::default(),
            manager: OnceCell::new(),
        }
    }

    /// Returns the shared connection, opening it on first call.
    ///
    /// A failed attempt leaves the cell empty, so the next call tries again.
    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                let client = redis::Client::open(self.info.clone())?;
                let connect =
                    ConnectionManager::new_with_config(client, self.settings.manager_config());
                let manager = tokio::time::timeout(self.settings.connect_budget(), connect)
                    .await
                    .map_err(|_| {
                        redis::RedisError::from((
                            ErrorKind::IoError,
                            "timed out connecting to cache store",
                        ))
                    })??;
                info!(store = %self.describe(), "connected to cache store");
                Ok::<_, redis::RedisError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<String> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        value.ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    async fn set(&self, key: &str, payload: String, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.pset_ex(key, payload, ttl_millis(ttl)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn.del(key).await?;
        debug!(key, removed, "delete");
        Ok(())
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("FLUSHALL").query_async(&mut conn).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        // Credentials stay out of logs
        format!("redis {}/{}", self.info.addr, self.info.redis.db)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("addr", &self.info.addr.to_string())
            .field("db", &self.info.redis.db)
            .field("settings", &self.settings)
            .field("connected", &self.manager.initialized())
            .finish()
    }
}

// == Utility Functions ==
/// Splits `host:port`, falling back to the default port when none parses.
fn split_addr(addr: &str) -> (String, u16) {
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => match port.parse() {
            Ok(port) => (trim_brackets(host), port),
            Err(_) => (trim_brackets(addr), DEFAULT_REDIS_PORT),
        },
        _ => (trim_brackets(addr), DEFAULT_REDIS_PORT),
    }
}

fn trim_brackets(host: &str) -> String {
    host.trim_start_matches('[').trim_end_matches(']').to_string()
}

/// PSETEX needs at least one millisecond and at most [`MAX_EXPIRY_MILLIS`].
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis())
        .unwrap_or(u64::MAX)
        .clamp(1, MAX_EXPIRY_MILLIS)
}
