//! CLI execution context

use std::path::Path;

use abtest_core::{AnalysisConfig, Dataset, GroupPolicy};
use anyhow::{Context as _, Result};

use crate::cli::Cli;
use crate::config::Settings;
use crate::output::OutputWriter;

/// Execution context for CLI commands
pub struct Context {
    /// Merged settings from every configuration source
    pub settings: Settings,

    /// Output writer
    pub output: OutputWriter,
}

impl Context {
    /// Create a new context from CLI arguments and loaded settings
    pub fn new(cli: &Cli, settings: Settings) -> Self {
        let output_format = cli.output.unwrap_or(settings.output.format);
        let color = settings.output.color && !cli.no_color;

        Self {
            output: OutputWriter::new(output_format, color),
            settings,
        }
    }

    /// Configured analysis thresholds with per-command overrides applied
    pub fn analysis_config(
        &self,
        alpha: Option<f64>,
        confidence: Option<f64>,
        power: Option<f64>,
        strict_groups: bool,
    ) -> AnalysisConfig {
        let mut config = self.settings.analysis;
        if let Some(alpha) = alpha {
            config = config.with_alpha(alpha);
        }
        if let Some(confidence) = confidence {
            config = config.with_confidence(confidence);
        }
        if let Some(power) = power {
            config = config.with_power(power);
        }
        if strict_groups {
            config = config.with_group_policy(GroupPolicy::Reject);
        }
        config
    }

    /// Load a dataset and warn about rows dropped for an unknown group label
    pub fn load_dataset(&self, path: &Path, policy: GroupPolicy) -> Result<Dataset> {
        let dataset = Dataset::load(path, policy)
            .with_context(|| format!("Failed to load dataset from {:?}", path))?;

        if dataset.dropped_rows() > 0 {
            self.output.warning(&format!(
                "Ignored {} row(s) with an unknown group label",
                dataset.dropped_rows()
            ));
        }
        Ok(dataset)
    }
}
