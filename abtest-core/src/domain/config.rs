use serde::{Deserialize, Serialize};
use validator::Validate;

use super::group::GroupPolicy;
use crate::error::Result;

pub const DEFAULT_ALPHA: f64 = 0.05;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;
pub const DEFAULT_POWER: f64 = 0.80;

/// Thresholds shared by every stage of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalysisConfig {
    /// Significance level for the hypothesis tests and power analysis.
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Coverage of the reported confidence intervals.
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Target power for the sample size calculation.
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    #[serde(default = "default_power")]
    pub power: f64,

    #[serde(default)]
    pub group_policy: GroupPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            confidence: DEFAULT_CONFIDENCE,
            power: DEFAULT_POWER,
            group_policy: GroupPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn with_group_policy(mut self, policy: GroupPolicy) -> Self {
        self.group_policy = policy;
        self
    }

    /// Validate and return the config, or a `CoreError::Validation`.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn default_power() -> f64 {
    DEFAULT_POWER
}
