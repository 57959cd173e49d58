//! Aside Cache - admin CLI
//!
//! Connects to the cache the same way the API server does and runs one
//! administrative command against it.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aside_cache::cli::{execute, Cli};
use aside_cache::{Cache, CacheConfig};

/// Entry point for the cache admin CLI.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging (stderr, so stdout stays parseable)
/// 2. Parse command-line arguments
/// 3. Load cache configuration from environment variables
/// 4. Build the cache handle: URL first, then address, else disabled
/// 5. Run the requested command
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aside_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CacheConfig::from_env();
    let cache = Cache::from_config(&config);
    info!(enabled = cache.is_enabled(), "cache ready");

    let mut stdout = std::io::stdout().lock();
    execute(cli.command, &cache, &mut stdout).await
}
