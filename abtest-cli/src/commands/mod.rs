//! Subcommand implementations

pub mod analyze;
pub mod report;
pub mod sample_size;
pub mod summary;

use anyhow::Result;

use crate::cli::Commands;
use crate::context::Context;

/// Dispatch a parsed subcommand
pub fn execute(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Analyze(args) => analyze::execute(ctx, args),
        Commands::Summary(args) => summary::execute(ctx, args),
        Commands::SampleSize(cmd) => sample_size::execute(ctx, cmd),
        Commands::ShowReport(args) => report::execute(ctx, args),
    }
}
