use abtest_core::{ContinuousMetric, DataError, GroupData, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Count, mean and sample variance (ddof = 1) of one group's metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleMoments {
    pub n: usize,
    pub mean: f64,
    pub variance: f64,
}

impl SampleMoments {
    /// Moments of a sample with at least two values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.len() < 2 {
            return None;
        }
        Some(Self {
            n: values.len(),
            mean: values.mean(),
            variance: values.variance(),
        })
    }

    /// Moments of a group's metric after dropping missing values.
    pub fn for_metric(group: &GroupData<'_>, metric: ContinuousMetric) -> Result<Self> {
        let values = group.values(metric)?;
        Self::from_values(&values).ok_or_else(|| {
            DataError::InsufficientData {
                metric: metric.as_str().to_string(),
                group: group.group(),
                available: values.len(),
                required: 2,
            }
            .into()
        })
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Squared standard error of the mean, var / n.
    pub fn squared_standard_error(&self) -> f64 {
        self.variance / self.n as f64
    }
}

/// Welch comparison of two independent samples, variant minus control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchComparison {
    pub difference: f64,
    pub standard_error: f64,
    pub degrees_of_freedom: f64,
}

impl WelchComparison {
    pub fn new(control: &SampleMoments, variant: &SampleMoments) -> Self {
        let se2_c = control.squared_standard_error();
        let se2_v = variant.squared_standard_error();
        let se2 = se2_c + se2_v;

        let denominator = se2_c.powi(2) / (control.n as f64 - 1.0)
            + se2_v.powi(2) / (variant.n as f64 - 1.0);
        // Both variances zero leaves Welch-Satterthwaite undefined; use the pooled df.
        let degrees_of_freedom = if denominator > 0.0 {
            se2.powi(2) / denominator
        } else {
            (control.n + variant.n - 2) as f64
        };

        Self {
            difference: variant.mean - control.mean,
            standard_error: se2.sqrt(),
            degrees_of_freedom,
        }
    }
}
