//! Disabled Store
//!
//! Stands in for an unconfigured backend: reads always miss, writes are dropped.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::Store;
use crate::error::{CacheError, Result};

/// Store used when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

#[async_trait]
impl Store for NoopStore {
    async fn get(&self, key: &str) -> Result<String> {
        Err(CacheError::NotFound(key.to_string()))
    }

    async fn set(&self, _key: &str, _payload: String, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn flush_all(&self) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}
