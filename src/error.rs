//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Connection URL could not be turned into connection options
    #[error("Invalid cache configuration: {0}")]
    Configuration(String),

    /// Key not present in the store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Network or protocol failure reported by the backing store
    #[error("Store error: {0}")]
    Connectivity(#[from] redis::RedisError),

    /// Stored payload does not fit the requested type
    #[error("Failed to decode cached value for '{key}': {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded before writing
    #[error("Failed to encode value for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Entries must always carry an expiry
    #[error("TTL must be greater than zero for key: {0}")]
    InvalidTtl(String),
}

impl CacheError {
    /// Returns true for the clean-miss signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
