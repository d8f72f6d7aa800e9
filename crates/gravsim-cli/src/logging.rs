//! Log subscriber setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Install structured logging on stderr, filtered by RUST_LOG and defaulting to info
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install the log subscriber: {}", e))
}
