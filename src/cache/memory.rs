//! In-Memory Store
//!
//! HashMap-backed store with lazy TTL expiration. Backs the test suites and
//! any embedder that wants the cache-aside flow inside a single process.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::cache::{CacheEntry, Store};
use crate::error::{CacheError, Result};

// == Memory Store ==
/// Process-local store. Expired entries are dropped when read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Number of entries held, expired ones included until read.
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<String> {
        // Write lock so an expired entry can be dropped in place
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                trace!(key, "dropped expired entry");
                Err(CacheError::NotFound(key.to_string()))
            }
            Some(entry) => Ok(entry.payload.clone()),
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    async fn set(&self, key: &str, payload: String, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(payload, ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn flush_all(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
