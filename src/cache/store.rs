//! Store Port
//!
//! The seam between the cache-aside logic and whatever holds the entries.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

// == Store Trait ==
/// Key-value backend with per-entry expiry.
///
/// Implementations must be safe for concurrent use once constructed and
/// must surface backend failures unmodified, without retrying.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the raw payload, or `CacheError::NotFound` when absent.
    async fn get(&self, key: &str) -> Result<String>;

    /// Stores a payload that expires `ttl` from now.
    async fn set(&self, key: &str, payload: String, ttl: Duration) -> Result<()>;

    /// Removes a key. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every key visible to this store.
    async fn flush_all(&self) -> Result<()>;

    /// False only for the stand-in used when caching is disabled.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Short label used in logs.
    fn describe(&self) -> String;
}
