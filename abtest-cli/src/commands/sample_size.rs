//! Standalone power calculators

use abtest_metrics::{conversion_uplift, power_analysis_conversion, power_analysis_ttest, PowerResult};
use anyhow::{ensure, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::context::Context;
use crate::output::{format_pct, print_field, print_section, TableDisplay};

/// Minimum sample size commands
#[derive(Debug, Args)]
pub struct SampleSizeCommands {
    #[command(subcommand)]
    pub command: SampleSizeSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum SampleSizeSubcommand {
    /// Users per group to detect a change in conversion rate
    Proportions {
        /// Current conversion rate, in [0, 1]
        #[arg(long)]
        baseline: f64,

        /// Conversion rate to detect, in [0, 1]
        #[arg(long)]
        expected: f64,

        /// Significance level (defaults to the configured alpha)
        #[arg(long)]
        alpha: Option<f64>,

        /// Target power (defaults to the configured power)
        #[arg(long)]
        power: Option<f64>,
    },

    /// Users per group to detect a shift in a continuous metric
    Means {
        #[arg(long)]
        mean1: f64,

        #[arg(long)]
        mean2: f64,

        #[arg(long)]
        std1: f64,

        #[arg(long)]
        std2: f64,

        /// Metric name used in the test label
        #[arg(long, default_value = "metric")]
        metric: String,

        /// Significance level (defaults to the configured alpha)
        #[arg(long)]
        alpha: Option<f64>,

        /// Target power (defaults to the configured power)
        #[arg(long)]
        power: Option<f64>,
    },
}

pub fn execute(ctx: &Context, cmd: SampleSizeCommands) -> Result<()> {
    match cmd.command {
        SampleSizeSubcommand::Proportions {
            baseline,
            expected,
            alpha,
            power,
        } => {
            let config = ctx.analysis_config(alpha, None, power, false);
            let estimate = proportions(baseline, expected, config.alpha, config.power)?;
            ctx.output.write(&estimate)
        }
        SampleSizeSubcommand::Means {
            mean1,
            mean2,
            std1,
            std2,
            metric,
            alpha,
            power,
        } => {
            let config = ctx.analysis_config(alpha, None, power, false);
            let estimate = means(mean1, mean2, std1, std2, &metric, config.alpha, config.power)?;
            ctx.output.write(&estimate)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProportionsEstimate {
    pub baseline: f64,
    pub expected: f64,
    pub uplift_pct: f64,
    pub power_analysis: PowerResult,
}

#[derive(Debug, Serialize)]
pub struct MeansEstimate {
    pub mean1: f64,
    pub mean2: f64,
    pub std1: f64,
    pub std2: f64,
    pub power_analysis: PowerResult,
}

fn proportions(baseline: f64, expected: f64, alpha: f64, power: f64) -> Result<ProportionsEstimate> {
    for (name, rate) in [("baseline", baseline), ("expected", expected)] {
        ensure!(
            (0.0..=1.0).contains(&rate),
            "{name} must be a rate between 0 and 1, got {rate}"
        );
    }

    Ok(ProportionsEstimate {
        baseline,
        expected,
        uplift_pct: (conversion_uplift(baseline, expected) * 100.0).round() / 100.0,
        power_analysis: power_analysis_conversion(baseline, expected, alpha, power)?,
    })
}

fn means(
    mean1: f64,
    mean2: f64,
    std1: f64,
    std2: f64,
    metric: &str,
    alpha: f64,
    power: f64,
) -> Result<MeansEstimate> {
    for (name, value) in [("mean1", mean1), ("mean2", mean2)] {
        ensure!(value.is_finite(), "{name} must be finite, got {value}");
    }
    for (name, value) in [("std1", std1), ("std2", std2)] {
        ensure!(
            value.is_finite() && value >= 0.0,
            "{name} must be a non-negative standard deviation, got {value}"
        );
    }

    Ok(MeansEstimate {
        mean1,
        mean2,
        std1,
        std2,
        power_analysis: power_analysis_ttest(mean1, mean2, std1, std2, metric, alpha, power)?,
    })
}

fn print_power(result: &PowerResult) {
    print_field("Test", &result.test);
    print_field(
        "Effect size",
        &format!("{} ({})", result.effect_size, result.effect_size_kind),
    );
    print_field("Alpha", &result.alpha.to_string());
    print_field("Power", &result.power.to_string());
    print_field(
        "Required per group",
        &result.required_sample_size_per_group.to_string(),
    );
}

impl TableDisplay for ProportionsEstimate {
    fn display_table(&self) {
        print_section("Sample Size: Conversion Rate");
        print_field("Baseline", &format_pct(self.baseline));
        print_field("Expected", &format_pct(self.expected));
        print_field("Relative uplift", &format!("{:.2}%", self.uplift_pct));
        print_power(&self.power_analysis);
    }
}

impl TableDisplay for MeansEstimate {
    fn display_table(&self) {
        print_section("Sample Size: Mean Difference");
        print_field("Means", &format!("{} vs {}", self.mean1, self.mean2));
        print_field("Std devs", &format!("{} vs {}", self.std1, self.std2));
        print_power(&self.power_analysis);
    }
}
