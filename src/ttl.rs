//! TTL Policy
//!
//! Maps a data category to how long its cached responses stay valid.
//!
//! The `character` override is read from the environment on every call, not
//! once at startup, so operators can retune it on a running process.

use std::env;
use std::time::Duration;

use tracing::warn;

// == Public Constants ==
/// Environment variable overriding the character TTL, in whole seconds
pub const CHARACTER_TTL_ENV: &str = "CACHE_TTL_CHARACTER";

/// TTL for `world` and `guild` responses
pub const WORLD_TTL: Duration = Duration::from_secs(10);
/// TTL for `highscores` responses
pub const HIGHSCORES_TTL: Duration = Duration::from_secs(60);
/// TTL for `character` responses without a valid override
pub const CHARACTER_TTL: Duration = Duration::from_secs(60);
/// TTL for any other category
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
/// Largest accepted override (30 days); bigger values are clamped to it
pub const MAX_TTL_OVERRIDE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Resolves the TTL for `category`, consulting the process environment.
///
/// Never fails and always returns a positive duration.
pub fn resolve_ttl(category: &str) -> Duration {
    resolve_ttl_with(category, |name| env::var(name).ok())
}

/// Same as [`resolve_ttl`] with the environment lookup supplied by the caller.
pub fn resolve_ttl_with<F>(category: &str, lookup: F) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    match category {
        "character" => lookup(CHARACTER_TTL_ENV)
            .and_then(|raw| parse_override(&raw))
            .unwrap_or(CHARACTER_TTL),
        "world" | "guild" => WORLD_TTL,
        "highscores" => HIGHSCORES_TTL,
        _ => DEFAULT_TTL,
    }
}

/// Accepts a positive whole number of seconds, capped at [`MAX_TTL_OVERRIDE`].
/// Anything else is ignored.
fn parse_override(raw: &str) -> Option<Duration> {
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<i64>() {
        Ok(secs) if secs > 0 && secs as u64 > MAX_TTL_OVERRIDE.as_secs() => {
            warn!(
                value = raw,
                max_secs = MAX_TTL_OVERRIDE.as_secs(),
                "clamping oversized {}",
                CHARACTER_TTL_ENV
            );
            Some(MAX_TTL_OVERRIDE)
        }
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs as u64)),
        _ => {
            warn!(
                value = raw,
                default_secs = CHARACTER_TTL.as_secs(),
                "ignoring invalid {}, using default",
                CHARACTER_TTL_ENV
            );
            None
        }
    }
}
