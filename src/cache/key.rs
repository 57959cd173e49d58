//! Cache Keys
//!
//! Builds deterministic keys from an endpoint name and its parameters.

use std::fmt;

/// Separator between key segments
pub const KEY_SEPARATOR: char = ':';

// == Cache Key ==
/// Key for one cacheable result, e.g. `character:bubble` or
/// `highscores:antica:experience:all:1`.
///
/// The same endpoint and parameters, in the same order, always produce the
/// same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(endpoint: &str) -> Self {
        Self(endpoint.to_string())
    }

    /// Appends one parameter segment.
    pub fn param(mut self, value: impl fmt::Display) -> Self {
        self.0.push(KEY_SEPARATOR);
        self.0.push_str(&value.to_string());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
