//! Cache Module
//!
//! Cache-aside layer over a key-value store with per-entry expiry.

mod client;
mod entry;
mod key;
mod memory;
mod noop;
mod redis_store;
mod stats;
mod store;


// Re-export public types
pub use client::Cache;
pub use entry::CacheEntry;
pub use key::{CacheKey, KEY_SEPARATOR};
pub use memory::MemoryStore;
pub use noop::NoopStore;
pub use redis_store::{ConnectionSettings, RedisStore, DEFAULT_REDIS_PORT, MAX_EXPIRY_MILLIS};
pub use stats::{CacheStats, LookupCounters};
pub use store::Store;
