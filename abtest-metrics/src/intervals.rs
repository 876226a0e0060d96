use abtest_core::{ContinuousMetric, CoreError, Dataset, Result};
use serde::{Deserialize, Serialize};

use crate::distributions::{normal_quantile, students_t_quantile};
use crate::sample::{SampleMoments, WelchComparison};
use crate::{check_group_size, check_probability, round_to};

/// Interval for a variant-minus-control difference. Always `lower <= point_estimate <= upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub metric: String,
    pub lower: f64,
    pub upper: f64,
    pub point_estimate: f64,
    pub confidence_level: f64,
}

impl ConfidenceInterval {
    fn around(metric: String, estimate: f64, margin: f64, confidence: f64, places: i32) -> Self {
        Self {
            metric,
            lower: round_to(estimate - margin, places),
            upper: round_to(estimate + margin, places),
            point_estimate: round_to(estimate, places),
            confidence_level: confidence,
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Whether the interval excludes a zero difference.
    pub fn excludes_zero(&self) -> bool {
        !self.contains(0.0)
    }
}

/// Upper-tail probability of a two-sided interval, 1 - (1 - c) / 2.
fn upper_tail(confidence: f64) -> f64 {
    1.0 - (1.0 - confidence) / 2.0
}

fn check_rate(name: &str, rate: f64) -> Result<()> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("{name} must be in [0, 1], got {rate}")))
    }
}

/// Normal-approximation interval for `rate_variant - rate_control`, rounded to 6 decimals.
pub fn proportion_difference_interval(
    rate_control: f64,
    n_control: usize,
    rate_variant: f64,
    n_variant: usize,
    confidence: f64,
) -> Result<ConfidenceInterval> {
    check_probability("confidence", confidence)?;
    check_group_size("n_control", n_control)?;
    check_group_size("n_variant", n_variant)?;
    check_rate("rate_control", rate_control)?;
    check_rate("rate_variant", rate_variant)?;
    let se = (rate_control * (1.0 - rate_control) / n_control as f64
        + rate_variant * (1.0 - rate_variant) / n_variant as f64)
        .sqrt();
    let z = normal_quantile(upper_tail(confidence));

    Ok(ConfidenceInterval::around(
        "conversion_rate_difference".to_string(),
        rate_variant - rate_control,
        z * se,
        confidence,
        6,
    ))
}

/// Welch interval for `mean_variant - mean_control`, rounded to 4 decimals.
pub fn mean_difference_interval(
    metric: ContinuousMetric,
    control: &SampleMoments,
    variant: &SampleMoments,
    confidence: f64,
) -> Result<ConfidenceInterval> {
    check_probability("confidence", confidence)?;
    let welch = WelchComparison::new(control, variant);
    let margin = if welch.standard_error > 0.0 {
        students_t_quantile(upper_tail(confidence), welch.degrees_of_freedom)? * welch.standard_error
    } else {
        0.0
    };

    Ok(ConfidenceInterval::around(
        format!("{metric}_difference"),
        welch.difference,
        margin,
        confidence,
        4,
    ))
}

pub fn ci_difference_proportions(dataset: &Dataset, confidence: f64) -> Result<ConfidenceInterval> {
    let (control, variant) = dataset.partition()?;
    proportion_difference_interval(
        control.conversion_rate(),
        control.n(),
        variant.conversion_rate(),
        variant.n(),
        confidence,
    )
}

pub fn ci_difference_means(
    dataset: &Dataset,
    metric: ContinuousMetric,
    confidence: f64,
) -> Result<ConfidenceInterval> {
    let (control, variant) = dataset.partition()?;
    let c = SampleMoments::for_metric(&control, metric)?;
    let v = SampleMoments::for_metric(&variant, metric)?;
    mean_difference_interval(metric, &c, &v, confidence)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceIntervals {
    pub conversion_rate: ConfidenceInterval,
    pub time_spent: ConfidenceInterval,
    pub clicks: ConfidenceInterval,
}

impl ConfidenceIntervals {
    pub fn intervals(&self) -> [(&'static str, &ConfidenceInterval); 3] {
        [
            ("conversion_rate", &self.conversion_rate),
            ("time_spent", &self.time_spent),
            ("clicks", &self.clicks),
        ]
    }
}

#[tracing::instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn compute_all_cis(dataset: &Dataset, confidence: f64) -> Result<ConfidenceIntervals> {
    let intervals = ConfidenceIntervals {
        conversion_rate: ci_difference_proportions(dataset, confidence)?,
        time_spent: ci_difference_means(dataset, ContinuousMetric::TimeSpent, confidence)?,
        clicks: ci_difference_means(dataset, ContinuousMetric::Clicks, confidence)?,
    };
    for (key, ci) in intervals.intervals() {
        tracing::debug!(metric = key, lower = ci.lower, upper = ci.upper, "Confidence interval");
    }
    Ok(intervals)
}
