//! Cache Handle
//!
//! The explicitly constructed handle passed to everything that caches. It
//! wraps one [`Store`] and layers JSON encoding, the cache-aside lookup and
//! lookup statistics on top of it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, LookupCounters, NoopStore, RedisStore, Store};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Cache ==
/// Shared cache handle. Cloning is cheap and clones share the same store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn Store>,
    counters: Arc<LookupCounters>,
}

impl Cache {
    // == Constructors ==
    /// Wraps an already built store.
    pub fn new<S: Store + 'static>(store: S) -> Self {
        Self::from_store(Arc::new(store))
    }

    /// Wraps a store that is already shared, e.g. one also held by a test.
    ///
    /// Lookup statistics start at zero and belong to this handle and its clones.
    pub fn from_store(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            counters: Arc::new(LookupCounters::default()),
        }
    }

    /// A handle that never stores anything. Every lookup is a clean miss.
    pub fn disabled() -> Self {
        Self::new(NoopStore)
    }

    /// Sets up a Redis-backed cache from a connection URL.
    ///
    /// On a malformed URL no handle is produced; callers keep running
    /// without a cache.
    pub fn setup_with_url(url: &str) -> Result<Self> {
        Ok(Self::new(RedisStore::from_url(url)?))
    }

    /// Sets up a Redis-backed cache from discrete parameters.
    ///
    /// Always succeeds; an unreachable server shows up as a
    /// `CacheError::Connectivity` on first use.
    pub fn setup(addr: &str, password: &str, db: i64) -> Self {
        Self::new(RedisStore::from_params(addr, password, db))
    }

    // == Bootstrap ==
    /// Builds the process cache from configuration: the URL when present,
    /// else the discrete parameters, else a disabled cache.
    ///
    /// Never fails. A bad URL is logged and leaves caching disabled.
    pub fn from_config(config: &CacheConfig) -> Self {
        if let Some(url) = &config.redis_url {
            return match RedisStore::from_url(url) {
                Ok(store) => {
                    let cache = Self::new(store.with_settings(config.connection));
                    info!(store = %cache.describe(), "cache initialized from URL");
                    cache
                }
                Err(err) => {
                    warn!(error = %err, "failed to set up cache from URL, running without cache");
                    Self::disabled()
                }
            };
        }

        if let Some(addr) = &config.redis_addr {
            let store = RedisStore::from_params(addr, &config.redis_password, config.redis_db);
            let cache = Self::new(store.with_settings(config.connection));
            info!(store = %cache.describe(), "cache initialized from address");
            return cache;
        }

        info!("cache not configured, running without cache");
        Self::disabled()
    }

    // == Introspection ==
    /// Returns false for a disabled handle, whose lookups always miss.
    pub fn is_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    /// Short description of the backing store for logs, e.g. `redis cache:6379/0`.
    /// Never includes the password.
    pub fn describe(&self) -> String {
        self.store.describe()
    }

    /// Lookup outcomes recorded by [`Cache::try_get_cached`].
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    // == Primitive Operations ==
    /// Returns the raw stored payload, or `CacheError::NotFound`.
    pub async fn get(&self, key: &str) -> Result<String> {
        self.store.get(key).await
    }

    /// Serializes `value` as JSON and stores it for `ttl`.
    ///
    /// A zero `ttl` is rejected: every entry carries an expiry.
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(key.to_string()));
        }

        let payload = serde_json::to_string(value).map_err(|source| CacheError::Serialization {
            key: key.to_string(),
            source,
        })?;

        self.store.set(key, payload, ttl).await?;
        debug!(key, ttl_ms = ttl.as_millis() as u64, "cache write");
        Ok(())
    }

    /// Removes one key. Missing keys are not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(key).await
    }

    /// Removes every key in the store. Administrative and test use only.
    pub async fn flush_all(&self) -> Result<()> {
        warn!(store = %self.describe(), "flushing all cache entries");
        self.store.flush_all().await
    }

    // == Cache-Aside Lookup ==
    /// Looks up `key` and decodes it as `T`.
    ///
    /// # Returns
    /// - `Ok(Some(value))` on a hit
    /// - `Ok(None)` when caching is disabled or the key is absent
    /// - `Err(CacheError::Connectivity)` when the store fails
    /// - `Err(CacheError::Deserialization)` when the payload does not fit `T`
    pub async fn try_get_cached<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        if !self.store.is_enabled() {
            self.counters.record_miss();
            return Ok(None);
        }

        let payload = match self.store.get(key).await {
            Ok(payload) => payload,
            Err(err) if err.is_not_found() => {
                self.counters.record_miss();
                debug!(key, "cache miss");
                return Ok(None);
            }
            Err(err) => {
                self.counters.record_error();
                return Err(err);
            }
        };

        match serde_json::from_str(&payload) {
            Ok(value) => {
                self.counters.record_hit();
                debug!(key, "cache hit");
                Ok(Some(value))
            }
            Err(source) => {
                self.counters.record_error();
                Err(CacheError::Deserialization {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    // == Read-Through ==
    /// Returns the cached value for `key`, or runs `fetch` and writes its
    /// result back for `ttl`.
    ///
    /// Cache failures are logged and treated as misses; only the error of
    /// `fetch` itself reaches the caller.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        match self.try_get_cached::<T>(key).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) => warn!(key, error = %err, "cache lookup failed, fetching fresh data"),
        }

        let value = fetch().await?;

        if let Err(err) = self.set(key, &value, ttl).await {
            warn!(key, error = %err, "failed to write fresh data to cache");
        }

        Ok(value)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("store", &self.describe())
            .field("stats", &self.stats())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ConnectionSettings, MemoryStore};
    use async_trait::async_trait;
    use serde::Deserialize;

    const TTL: Duration = Duration::from_secs(60);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct World {
        name: String,
        players_online: u32,
    }

    fn antica() -> World {
        World {
            name: "Antica".to_string(),
            players_online: 512,
        }
    }

    /// Store whose every call fails like a dropped connection.
    struct BrokenStore;

    fn connection_refused() -> CacheError {
        redis::RedisError::from((redis::ErrorKind::IoError, "connection refused")).into()
    }

    #[async_trait]
    impl Store for BrokenStore {
        async fn get(&self, _key: &str) -> Result<String> {
            Err(connection_refused())
        }

        async fn set(&self, _key: &str, _payload: String, _ttl: Duration) -> Result<()> {
            Err(connection_refused())
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(connection_refused())
        }

        async fn flush_all(&self) -> Result<()> {
            Err(connection_refused())
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[tokio::test]
    async fn test_disabled_lookup_is_clean_miss() {
        let cache = Cache::disabled();
        assert!(!cache.is_enabled());

        let result = cache.try_get_cached::<World>("world:antica").await.unwrap();
        assert!(result.is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_disabled_write_is_silently_dropped() {
        let cache = Cache::disabled();
        cache.set("world:antica", &antica(), TTL).await.unwrap();

        assert!(cache.try_get_cached::<World>("world:antica").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hit_after_write() {
        let cache = Cache::new(MemoryStore::new());
        cache.set("world:antica", &antica(), TTL).await.unwrap();

        let cached: Option<World> = cache.try_get_cached("world:antica").await.unwrap();
        assert_eq!(cached, Some(antica()));
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_scalar_values_are_json_encoded() {
        let cache = Cache::new(MemoryStore::new());
        cache.set("count", &42u32, TTL).await.unwrap();
        cache.set("name", "Bubble", TTL).await.unwrap();

        assert_eq!(cache.get("count").await.unwrap(), "42");
        assert_eq!(cache.get("name").await.unwrap(), "\"Bubble\"");
        assert_eq!(cache.try_get_cached::<String>("name").await.unwrap().as_deref(), Some("Bubble"));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_not_found() {
        let cache = Cache::new(MemoryStore::new());
        let result = cache.get("missing").await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let cache = Cache::new(MemoryStore::new());
        let result = cache.set("k", &1, Duration::ZERO).await;
        assert!(matches!(result, Err(CacheError::InvalidTtl(_))));
        assert!(cache.get("k").await.is_err());
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let cache = Cache::new(BrokenStore);

        let result = cache.try_get_cached::<World>("world:antica").await;
        assert!(matches!(result, Err(CacheError::Connectivity(_))));
        assert_eq!(cache.stats().errors, 1);

        assert!(matches!(
            cache.set("k", &1, TTL).await,
            Err(CacheError::Connectivity(_))
        ));
        assert!(cache.delete("k").await.is_err());
        assert!(cache.flush_all().await.is_err());
    }

    #[tokio::test]
    async fn test_mismatched_payload_is_deserialization_error() {
        let cache = Cache::new(MemoryStore::new());
        cache.set("world:antica", &antica(), TTL).await.unwrap();

        let result = cache.try_get_cached::<Vec<u64>>("world:antica").await;
        assert!(matches!(result, Err(CacheError::Deserialization { .. })));
    }

    #[tokio::test]
    async fn test_get_or_fetch_populates_on_miss() {
        let cache = Cache::new(MemoryStore::new());

        let value: World = cache
            .get_or_fetch("world:antica", TTL, || async { Ok::<_, String>(antica()) })
            .await
            .unwrap();
        assert_eq!(value, antica());

        let cached: Option<World> = cache.try_get_cached("world:antica").await.unwrap();
        assert_eq!(cached, Some(antica()));
    }

    #[tokio::test]
    async fn test_get_or_fetch_skips_fetch_on_hit() {
        let cache = Cache::new(MemoryStore::new());
        cache.set("world:antica", &antica(), TTL).await.unwrap();

        let value: World = cache
            .get_or_fetch("world:antica", TTL, || async {
                Err::<World, _>("fetch should not run".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, antica());
    }

    #[tokio::test]
    async fn test_get_or_fetch_survives_broken_store() {
        let cache = Cache::new(BrokenStore);

        let value: World = cache
            .get_or_fetch("world:antica", TTL, || async { Ok::<_, String>(antica()) })
            .await
            .unwrap();
        assert_eq!(value, antica());
    }

    #[tokio::test]
    async fn test_get_or_fetch_propagates_fetch_error() {
        let cache = Cache::new(MemoryStore::new());

        let result: std::result::Result<World, String> = cache
            .get_or_fetch("world:antica", TTL, || async { Err("upstream down".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "upstream down");
        assert!(cache.get("world:antica").await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_degrades_quickly() {
        // Port 1 is reserved and nothing listens on it
        let cache = Cache::setup("127.0.0.1:1", "", 0);
        let bound = Duration::from_secs(10);

        let result = tokio::time::timeout(bound, cache.try_get_cached::<World>("world:antica"))
            .await
            .expect("lookup against a closed port should give up quickly");
        assert!(matches!(result, Err(CacheError::Connectivity(_))));
        assert_eq!(cache.stats().errors, 1);

        let value: World = tokio::time::timeout(
            bound,
            cache.get_or_fetch("world:antica", TTL, || async { Ok::<_, String>(antica()) }),
        )
        .await
        .expect("read-through against a closed port should give up quickly")
        .unwrap();
        assert_eq!(value, antica());
    }

    #[tokio::test]
    async fn test_from_config_applies_connection_settings() {
        // Non-routable address: without the configured limits a connect
        // attempt here waits on the default timeouts
        let config = CacheConfig {
            redis_addr: Some("10.255.255.1".to_string()),
            connection: ConnectionSettings {
                connect_timeout: Duration::from_millis(200),
                response_timeout: Duration::from_millis(200),
                max_retries: 0,
            },
            ..Default::default()
        };
        let cache = Cache::from_config(&config);

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            cache.try_get_cached::<World>("world:antica"),
        )
        .await
        .expect("configured connect timeout should bound the lookup");
        assert!(matches!(result, Err(CacheError::Connectivity(_))));
    }

    #[test]
    fn test_from_config_unconfigured_is_disabled() {
        let cache = Cache::from_config(&CacheConfig::default());
        assert!(!cache.is_enabled());
    }

    #[test]
    fn test_from_config_bad_url_is_disabled() {
        let config = CacheConfig {
            redis_url: Some("definitely not a url".to_string()),
            redis_addr: Some("localhost:6379".to_string()),
            ..Default::default()
        };
        let cache = Cache::from_config(&config);
        assert!(!cache.is_enabled(), "a bad URL must not fall through to params");
    }

    #[test]
    fn test_from_config_prefers_url() {
        let config = CacheConfig {
            redis_url: Some("redis://url-host:6379/5".to_string()),
            redis_addr: Some("param-host:6379".to_string()),
            ..Default::default()
        };
        let cache = Cache::from_config(&config);
        assert!(cache.is_enabled());
        assert!(cache.describe().contains("url-host"));
    }

    #[test]
    fn test_from_config_params() {
        let config = CacheConfig {
            redis_addr: Some("param-host:6380".to_string()),
            redis_db: 2,
            ..Default::default()
        };
        let cache = Cache::from_config(&config);
        assert!(cache.is_enabled());
        assert!(cache.describe().contains("param-host"));
    }

    #[test]
    fn test_setup_with_url_rejects_malformed() {
        assert!(matches!(
            Cache::setup_with_url("::not-a-url"),
            Err(CacheError::Configuration(_))
        ));
    }
}
