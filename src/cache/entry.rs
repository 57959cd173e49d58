//! Cache Entry Module
//!
//! A stored payload together with the instant it stops being valid.

use std::time::{Duration, Instant};

/// Expiry used when `now + ttl` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A single JSON payload held by the in-memory store.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized value
    pub payload: String,
    /// Point after which the entry counts as absent
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    pub fn new(payload: String, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            payload,
            expires_at: now.checked_add(ttl).unwrap_or(now + FAR_FUTURE),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches `expires_at`.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
