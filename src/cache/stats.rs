//! Cache Statistics Module
//!
//! Counts lookup outcomes of the cache-aside helper.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Lookup Counters ==
/// Shared, lock-free counters updated on every lookup.
#[derive(Debug, Default)]
pub struct LookupCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

impl LookupCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

// == Cache Stats ==
/// Lookup outcomes since the handle was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a decoded value
    pub hits: u64,
    /// Lookups that found nothing, including while disabled
    pub misses: u64,
    /// Lookups that failed on the store or while decoding
    pub errors: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / all lookups, or 0.0 if there were none.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.errors;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
