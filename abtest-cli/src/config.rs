//! Layered CLI settings
//!
//! Sources, lowest precedence first: built-in defaults, the user
//! `config.toml`, an explicit `--config` file, `ABTEST_*` environment
//! variables (`ABTEST_ANALYSIS__ALPHA=0.01`). Command-line flags are applied
//! on top by the commands themselves.

use std::path::{Path, PathBuf};

use abtest_core::AnalysisConfig;
use abtest_report::ReportConfig;
use anyhow::{Context as _, Result};
use config::{Config as ConfigLoader, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;
use crate::output::OutputFormat;

pub const ENV_PREFIX: &str = "ABTEST";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "abtest=info,abtest_core=info,abtest_metrics=info,abtest_report=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub logging: LogSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Load settings from every source, with `explicit` layered over the user file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user = Self::config_path().ok();
        Self::load_layers(user.as_deref(), explicit, ENV_PREFIX)
    }

    pub fn load_layers(user: Option<&Path>, explicit: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let defaults = ConfigLoader::try_from(&Settings::default())
            .context("Failed to build default settings")?;
        let mut builder = ConfigLoader::builder().add_source(defaults);

        if let Some(path) = user {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file {:?} does not exist", path);
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        tracing::debug!(?settings, "Settings loaded");
        Ok(settings)
    }

    /// Get the user configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "abtest", "abtest")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}
