//! Saved report viewer

use std::path::PathBuf;

use abtest_report::{render_text, AnalysisReport};
use anyhow::{Context as _, Result};
use clap::Args;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct ShowReportArgs {
    /// Path to a report.json written by `analyze`
    pub file: PathBuf,

    /// Print the plain-text report layout instead of the selected output format
    #[arg(long)]
    pub text: bool,
}

pub fn execute(ctx: &Context, args: ShowReportArgs) -> Result<()> {
    let report = AnalysisReport::load(&args.file)
        .with_context(|| format!("Failed to read report {:?}", args.file))?;

    if args.text {
        print!("{}", render_text(&report));
        return Ok(());
    }
    ctx.output.write(&report)
}
