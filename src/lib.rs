//! Aside Cache - cache-aside layer for the scraping API
//!
//! Redis-backed response cache with per-category TTLs. A disabled cache is a
//! first-class state: lookups miss and writes are dropped.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod ttl;

pub use cache::{Cache, CacheKey};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use ttl::resolve_ttl;
