//! Full analysis command

use std::path::PathBuf;

use abtest_metrics::Analyzer;
use abtest_report::{AnalysisReport, ReportFormat, ReportWriter};
use anyhow::{Context as _, Result};
use clap::Args;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Dataset file (.csv or .json)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Significance level for the hypothesis tests
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Confidence level for the intervals
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Target power for the sample size calculation
    #[arg(long)]
    pub power: Option<f64>,

    /// Fail on rows whose group is neither control nor variant
    #[arg(long)]
    pub strict_groups: bool,

    /// Directory for report files (defaults to the configured directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Report formats to write, comma-separated or repeated
    #[arg(long = "report", value_name = "FORMAT", value_delimiter = ',')]
    pub reports: Vec<ReportFormat>,
}

impl AnalyzeArgs {
    /// Reports are written only when a directory or format was asked for.
    fn wants_reports(&self) -> bool {
        self.output_dir.is_some() || !self.reports.is_empty()
    }
}

pub fn execute(ctx: &Context, args: AnalyzeArgs) -> Result<()> {
    let config = ctx.analysis_config(args.alpha, args.confidence, args.power, args.strict_groups);
    let analyzer = Analyzer::new(config)?;

    let dataset = ctx.load_dataset(&args.data, config.group_policy)?;
    let analysis = analyzer.analyze(&dataset)?;
    let report = AnalysisReport::new(dataset.info(), analysis);

    tracing::info!(
        run_id = %report.run_id,
        recommendation = %report.analysis.business_insights.recommendation,
        "Analysis complete"
    );

    ctx.output.write(&report)?;

    if args.wants_reports() {
        let mut report_config = ctx.settings.report.clone();
        if let Some(dir) = args.output_dir {
            report_config.output_dir = dir;
        }
        if !args.reports.is_empty() {
            report_config = report_config.with_formats(args.reports);
        }

        let written = ReportWriter::new(report_config)
            .write(&report)
            .context("Failed to write reports")?;
        for file in written {
            ctx.output
                .success(&format!("Wrote {} report to {}", file.format, file.path.display()));
        }
    }

    Ok(())
}
