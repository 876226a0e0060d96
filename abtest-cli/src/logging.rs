//! Structured logging setup
//!
//! Logs always go to stderr so stdout stays parseable under `--output json`.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogSettings;

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// Machine-readable JSON lines
    Json,
}

/// Debug-level filter for every workspace crate
const VERBOSE_FILTER: &str = "abtest=debug,abtest_core=debug,abtest_metrics=debug,abtest_report=debug";

/// Build the filter: `--verbose` wins, then `RUST_LOG`, then the configured level.
pub fn build_filter(settings: &LogSettings, verbose: bool) -> Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new(VERBOSE_FILTER));
    }
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level)
            .map_err(|e| anyhow!("Invalid log filter {:?}: {e}", settings.level)),
    }
}

pub fn init_logging(settings: &LogSettings, verbose: bool) -> Result<()> {
    let filter = build_filter(settings, verbose)?;

    let layer = match settings.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    tracing::debug!(format = ?settings.format, "Logging initialized");
    Ok(())
}
