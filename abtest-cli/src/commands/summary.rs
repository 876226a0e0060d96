//! Descriptive statistics command

use std::path::PathBuf;

use abtest_core::AnalysisStage;
use abtest_metrics::compute_metrics_summary;
use anyhow::Result;
use clap::Args;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Dataset file (.csv or .json)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Fail on rows whose group is neither control nor variant
    #[arg(long)]
    pub strict_groups: bool,
}

pub fn execute(ctx: &Context, args: SummaryArgs) -> Result<()> {
    let policy = ctx
        .analysis_config(None, None, None, args.strict_groups)
        .group_policy;
    let dataset = ctx.load_dataset(&args.data, policy)?;

    let summary = compute_metrics_summary(&dataset)
        .map_err(|e| e.in_stage(AnalysisStage::MetricsSummary))?;
    ctx.output.write(&summary)
}
