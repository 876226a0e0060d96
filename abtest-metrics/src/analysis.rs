use abtest_core::{AnalysisConfig, AnalysisStage, Dataset, Result};
use serde::{Deserialize, Serialize};

use crate::hypothesis::{run_all_tests, HypothesisTests};
use crate::intervals::{compute_all_cis, ConfidenceIntervals};
use crate::power::{run_power_analysis, PowerAnalysis};
use crate::recommendation::{generate_business_insights, BusinessInsights};
use crate::summary::{compute_metrics_summary, MetricsSummary};

/// Everything one analysis run produces. Field names are the stable output keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestAnalysis {
    pub metrics_summary: MetricsSummary,
    pub hypothesis_tests: HypothesisTests,
    pub confidence_intervals: ConfidenceIntervals,
    pub power_analysis: PowerAnalysis,
    pub business_insights: BusinessInsights,
}

/// Runs every stage over a dataset with one validated configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            config: config.validated()?,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full pipeline. The first failing stage aborts the run.
    pub fn analyze(&self, dataset: &Dataset) -> Result<AbTestAnalysis> {
        let span = tracing::info_span!("analyze", rows = dataset.len(), alpha = self.config.alpha);
        let _enter = span.enter();

        let metrics_summary = compute_metrics_summary(dataset)
            .map_err(|e| e.in_stage(AnalysisStage::MetricsSummary))?;
        tracing::info!("Metrics summary complete");

        let hypothesis_tests = run_all_tests(dataset, self.config.alpha)
            .map_err(|e| e.in_stage(AnalysisStage::HypothesisTests))?;
        tracing::info!(
            significant = hypothesis_tests.significant_count(),
            "Hypothesis tests complete"
        );

        let confidence_intervals = compute_all_cis(dataset, self.config.confidence)
            .map_err(|e| e.in_stage(AnalysisStage::ConfidenceIntervals))?;
        tracing::info!("Confidence intervals complete");

        let power_analysis = run_power_analysis(dataset, self.config.alpha, self.config.power)
            .map_err(|e| e.in_stage(AnalysisStage::PowerAnalysis))?;
        tracing::info!("Power analysis complete");

        let business_insights =
            generate_business_insights(&metrics_summary, &hypothesis_tests, &power_analysis);

        Ok(AbTestAnalysis {
            metrics_summary,
            hypothesis_tests,
            confidence_intervals,
            power_analysis,
            business_insights,
        })
    }
}
