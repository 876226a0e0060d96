//! Rollout decision from test results and power analysis.

use serde::{Deserialize, Serialize};

use crate::hypothesis::HypothesisTests;
use crate::power::PowerAnalysis;
use crate::summary::MetricsSummary;

pub const TOTAL_METRICS_TESTED: usize = 3;

/// Conversion uplift (percent) that is worth shipping on its own.
pub const PRACTICAL_UPLIFT_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "ROLLOUT")]
    Rollout,
    #[serde(rename = "DO NOT ROLLOUT")]
    DoNotRollout,
    #[serde(rename = "MONITOR")]
    Monitor,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rollout => write!(f, "ROLLOUT"),
            Self::DoNotRollout => write!(f, "DO NOT ROLLOUT"),
            Self::Monitor => write!(f, "MONITOR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessInsights {
    pub insights: Vec<String>,
    pub recommendation: Recommendation,
    pub rationale: String,
    pub significant_metrics: usize,
    pub total_metrics_tested: usize,
}

/// Apply the decision rules in order; the first that matches wins.
pub fn decide(
    conversion_significant: bool,
    significant_metrics: usize,
    uplift_pct: f64,
) -> (Recommendation, String) {
    if significant_metrics >= 2 && conversion_significant && uplift_pct > 0.0 {
        (
            Recommendation::Rollout,
            "Multiple metrics show statistically significant improvement in the variant. \
             A positive conversion uplift with increased engagement metrics strongly supports \
             deploying the variant to all users."
                .to_string(),
        )
    } else if conversion_significant && uplift_pct > PRACTICAL_UPLIFT_PCT {
        (
            Recommendation::Rollout,
            format!(
                "Conversion rate uplift of {uplift_pct:.2}% is both statistically significant and \
                 practically meaningful. Recommend full rollout."
            ),
        )
    } else if significant_metrics == 1 && !conversion_significant {
        (
            Recommendation::DoNotRollout,
            "No significant improvement in the primary metric (conversion rate). \
             Engagement improvements alone do not justify a full rollout. \
             Consider further experimentation."
                .to_string(),
        )
    } else {
        (
            Recommendation::Monitor,
            "Results are mixed. Some metrics show improvement but the primary metric \
             does not meet significance thresholds. Recommend extending the experiment."
                .to_string(),
        )
    }
}

fn more_or_fewer(diff: f64) -> &'static str {
    if diff >= 0.0 {
        "more"
    } else {
        "fewer"
    }
}

pub fn generate_business_insights(
    metrics: &MetricsSummary,
    tests: &HypothesisTests,
    power: &PowerAnalysis,
) -> BusinessInsights {
    let conversion_significant = tests.conversion_rate.significant;
    let uplift = power.conversion_uplift_pct;
    let diff = &metrics.differences;

    let mut insights = Vec::new();

    if conversion_significant {
        let direction = if uplift >= 0.0 { "lift" } else { "drop" };
        insights.push(format!(
            "The variant group achieved a statistically significant {direction} of {:.2}% in \
             conversion rate ({:.2}% → {:.2}%). This directly impacts revenue.",
            uplift.abs(),
            metrics.control.conversion_rate * 100.0,
            metrics.variant.conversion_rate * 100.0,
        ));
    } else {
        insights.push(
            "Conversion rate difference is not statistically significant. \
             No reliable evidence the variant improves conversions."
                .to_string(),
        );
    }

    if tests.time_spent.significant {
        insights.push(format!(
            "Users in the variant spent on average {:.2} {} minutes per session, \
             indicating {} engagement.",
            diff.time_spent_diff.abs(),
            more_or_fewer(diff.time_spent_diff),
            if diff.time_spent_diff >= 0.0 { "improved" } else { "reduced" },
        ));
    }

    if tests.clicks.significant {
        insights.push(format!(
            "Variant users averaged {:.2} {} clicks, suggesting {} interaction with the product.",
            diff.clicks_diff.abs(),
            more_or_fewer(diff.clicks_diff),
            if diff.clicks_diff >= 0.0 { "better" } else { "weaker" },
        ));
    }

    let significant_metrics = tests.significant_count();
    let (recommendation, rationale) = decide(conversion_significant, significant_metrics, uplift);

    tracing::info!(
        %recommendation,
        significant_metrics,
        uplift_pct = uplift,
        "Recommendation generated"
    );

    BusinessInsights {
        insights,
        recommendation,
        rationale,
        significant_metrics,
        total_metrics_tested: TOTAL_METRICS_TESTED,
    }
}
