mod cli;
mod commands;
mod config;
mod context;
mod display;
mod logging;
mod output;

use std::process::ExitCode;

use abtest_core::CoreError;
use clap::Parser;

use crate::cli::Cli;
use crate::config::Settings;
use crate::context::Context;
use crate::output::OutputWriter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            let output = OutputWriter::new(cli.output.unwrap_or_default(), !cli.no_color);
            report_error(&output, &err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logging::init_logging(&settings.logging, cli.verbose) {
        eprintln!("Warning: {err:#}");
    }

    let ctx = Context::new(&cli, settings);
    match commands::execute(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&ctx.output, &err);
            ExitCode::FAILURE
        }
    }
}

/// Print a failure, naming the analysis stage when one is known
fn report_error(output: &OutputWriter, err: &anyhow::Error) {
    let stage = err.downcast_ref::<CoreError>().and_then(CoreError::stage);
    tracing::debug!(error = ?err, "Command failed");
    output.error(stage.map(|s| s.as_str()), &error_message(err));
}

/// Join the error chain, skipping causes already spelled out by the error above them
fn error_message(err: &anyhow::Error) -> String {
    let mut message = String::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if message.ends_with(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use abtest_core::{AnalysisStage, DataError, Group};
    use anyhow::Context as _;

    #[test]
    fn test_error_message_skips_repeated_causes() {
        let err = anyhow::Error::from(
            CoreError::from(DataError::EmptyGroup(Group::Variant))
                .in_stage(AnalysisStage::MetricsSummary),
        );
        assert_eq!(
            error_message(&err),
            "metrics_summary failed: Data error: Group 'variant' has no observations"
        );
    }

    #[test]
    fn test_error_message_keeps_context() {
        let err: anyhow::Error = Err::<(), _>(CoreError::from(DataError::MissingColumn(
            "clicks".to_string(),
        )))
        .context("Failed to load dataset")
        .unwrap_err();
        assert_eq!(
            error_message(&err),
            "Failed to load dataset: Data error: Missing required column 'clicks'"
        );
    }
}
