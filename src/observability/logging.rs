//! # Logging
//!
//! `tracing-subscriber` setup for the command line driver.
//!
//! Logs go to stderr; stdout carries the lifecycle response.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::ProviderConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured log level when set.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &ProviderConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_logs() {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install JSON log subscriber: {e}"))
    } else {
        builder
            .with_ansi(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
    }
}
