use abtest_core::{ContinuousMetric, Dataset, GroupData, Result};
use serde::{Deserialize, Serialize};

use crate::round_to;
use crate::sample::SampleMoments;

/// Descriptive statistics for one experiment group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub n_users: usize,
    pub conversion_rate: f64,
    pub avg_time_spent: f64,
    pub avg_clicks: f64,
    pub avg_session_count: f64,
    pub total_conversions: u64,
    pub var_time_spent: f64,
    pub var_clicks: f64,
}

impl GroupStats {
    pub fn from_group(group: &GroupData<'_>) -> Result<Self> {
        let time_spent = SampleMoments::for_metric(group, ContinuousMetric::TimeSpent)?;
        let clicks = SampleMoments::for_metric(group, ContinuousMetric::Clicks)?;

        Ok(Self {
            n_users: group.n(),
            conversion_rate: round_to(group.conversion_rate(), 4),
            avg_time_spent: round_to(time_spent.mean, 4),
            avg_clicks: round_to(clicks.mean, 4),
            avg_session_count: round_to(group.mean_session_count(), 4),
            total_conversions: group.conversions(),
            var_time_spent: round_to(time_spent.variance, 4),
            var_clicks: round_to(clicks.variance, 4),
        })
    }
}

/// Variant minus control, computed from unrounded means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDifferences {
    pub conversion_rate_diff: f64,
    pub time_spent_diff: f64,
    pub clicks_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub control: GroupStats,
    pub variant: GroupStats,
    pub differences: MetricDifferences,
}

#[tracing::instrument(skip_all, fields(rows = dataset.len()))]
pub fn compute_metrics_summary(dataset: &Dataset) -> Result<MetricsSummary> {
    let (control, variant) = dataset.partition()?;

    let mean_diff = |metric: ContinuousMetric| -> Result<f64> {
        let c = SampleMoments::for_metric(&control, metric)?;
        let v = SampleMoments::for_metric(&variant, metric)?;
        Ok(round_to(v.mean - c.mean, 4))
    };

    let summary = MetricsSummary {
        control: GroupStats::from_group(&control)?,
        variant: GroupStats::from_group(&variant)?,
        differences: MetricDifferences {
            conversion_rate_diff: round_to(variant.conversion_rate() - control.conversion_rate(), 4),
            time_spent_diff: mean_diff(ContinuousMetric::TimeSpent)?,
            clicks_diff: mean_diff(ContinuousMetric::Clicks)?,
        },
    };

    tracing::debug!(
        control_users = summary.control.n_users,
        variant_users = summary.variant.n_users,
        conversion_rate_diff = summary.differences.conversion_rate_diff,
        "Metrics summary computed"
    );
    Ok(summary)
}
