//! Command-line interface for inspecting and administering the cache
//!
//! The binary connects using the same environment variables as the API
//! server, so operators see exactly what the server sees.

use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::cache::Cache;
use crate::error::CacheError;
use crate::ttl::resolve_ttl;

/// Categories reported by `status`
pub const KNOWN_CATEGORIES: [&str; 4] = ["world", "guild", "highscores", "character"];

/// Aside Cache - inspect and administer the scraper's response cache
#[derive(Parser, Debug)]
#[command(name = "aside_cache")]
#[command(about = "Inspect and administer the scraper's response cache")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the raw payload stored under a key
    Get { key: String },

    /// Store a value under a key
    ///
    /// The value is parsed as JSON; anything that does not parse is stored as
    /// a JSON string.
    Set {
        key: String,
        value: String,
        /// Expiry in seconds, overrides --category
        #[arg(long)]
        ttl: Option<u64>,
        /// Data category whose TTL policy applies
        #[arg(long)]
        category: Option<String>,
    },

    /// Remove a key
    Del { key: String },

    /// Remove every key in the store
    Flush {
        /// Confirm the flush
        #[arg(long)]
        yes: bool,
    },

    /// Print the TTL currently resolved for a category
    Ttl { category: String },

    /// Print whether caching is enabled and the active TTL table
    Status,
}

/// Picks the expiry for `set`: explicit seconds, else the category policy.
pub fn resolve_set_ttl(ttl: Option<u64>, category: Option<&str>) -> Duration {
    match ttl {
        Some(secs) => Duration::from_secs(secs),
        None => resolve_ttl(category.unwrap_or_default()),
    }
}

/// Runs one command against `cache`, writing human-readable output to `out`.
pub async fn execute<W: Write>(command: Command, cache: &Cache, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Get { key } => match cache.get(&key).await {
            Ok(payload) => writeln!(out, "{payload}")?,
            Err(CacheError::NotFound(_)) => writeln!(out, "(nil)")?,
            Err(err) => return Err(err).with_context(|| format!("failed to read '{key}'")),
        },
        Command::Set {
            key,
            value,
            ttl,
            category,
        } => {
            let ttl = resolve_set_ttl(ttl, category.as_deref());
            let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            cache
                .set(&key, &value, ttl)
                .await
                .with_context(|| format!("failed to write '{key}'"))?;
            writeln!(out, "OK ({}s)", ttl.as_secs())?;
        }
        Command::Del { key } => {
            cache
                .delete(&key)
                .await
                .with_context(|| format!("failed to delete '{key}'"))?;
            writeln!(out, "OK")?;
        }
        Command::Flush { yes } => {
            if !yes {
                bail!("refusing to flush without --yes");
            }
            cache.flush_all().await.context("failed to flush cache")?;
            writeln!(out, "OK")?;
        }
        Command::Ttl { category } => {
            writeln!(out, "{}", resolve_ttl(&category).as_secs())?;
        }
        Command::Status => {
            let state = if cache.is_enabled() { "enabled" } else { "disabled" };
            writeln!(out, "cache: {state} ({})", cache.describe())?;
            for category in KNOWN_CATEGORIES {
                writeln!(out, "ttl {category}: {}s", resolve_ttl(category).as_secs())?;
            }
        }
    }

    Ok(())
}
