//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::analyze::AnalyzeArgs;
use crate::commands::report::ShowReportArgs;
use crate::commands::sample_size::SampleSizeCommands;
use crate::commands::summary::SummaryArgs;
use crate::output::OutputFormat;

/// Statistical analysis of A/B test experiments
#[derive(Debug, Parser)]
#[command(name = "abtest", version, about, long_about = None)]
pub struct Cli {
    /// Output format (defaults to the configured format, then table)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file layered over the user configuration
    #[arg(short, long, global = true, env = "ABTEST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full analysis pipeline over a dataset
    Analyze(AnalyzeArgs),

    /// Print descriptive statistics per group
    Summary(SummaryArgs),

    /// Minimum sample size calculators
    SampleSize(SampleSizeCommands),

    /// Render a saved report.json
    ShowReport(ShowReportArgs),
}
