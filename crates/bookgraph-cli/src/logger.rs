//! Logging initialisation via tracing-subscriber.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Resolve the effective filter directive: `RUST_LOG` wins, then `-v`
/// flags, then the configured level.
pub fn effective_level(configured: &str, verbose: u8) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Initialise the global tracing subscriber, writing to stderr so stdout
/// stays clean for JSON output.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level '{level}'"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set subscriber: {e}"))?;

    Ok(())
}
