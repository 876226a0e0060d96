//! Effect sizes and minimum sample sizes.
//!
//! Sample sizes come from the normal approximation: for two proportions
//! `n = ((z_{1-α/2} + z_power) / h)²`, for two means
//! `n = 2 · ((z_{1-α/2} + z_power) / d)²`, rounded up to a whole user.

use abtest_core::{ContinuousMetric, Dataset, Result};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::distributions::normal_quantile;
use crate::sample::SampleMoments;
use crate::{check_probability, round_to};

/// Per-group sample size needed to reach the target power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredSampleSize {
    Finite(u64),
    /// No sample is large enough: the effect size is zero.
    Infinite,
}

impl RequiredSampleSize {
    /// Ceiling of a real-valued solution. Values past `u64::MAX` saturate.
    pub fn from_real(n: f64) -> Self {
        if n.is_infinite() && n > 0.0 {
            return Self::Infinite;
        }
        let n = n.max(0.0).ceil();
        if n >= u64::MAX as f64 {
            Self::Finite(u64::MAX)
        } else {
            Self::Finite(n as u64)
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Finite(_))
    }

    pub fn as_finite(&self) -> Option<u64> {
        match self {
            Self::Finite(n) => Some(*n),
            Self::Infinite => None,
        }
    }
}

impl std::fmt::Display for RequiredSampleSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(n) => write!(f, "{n}"),
            Self::Infinite => write!(f, "infinite"),
        }
    }
}

const INFINITE: &str = "infinite";

impl Serialize for RequiredSampleSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Finite(n) => serializer.serialize_u64(*n),
            Self::Infinite => serializer.serialize_str(INFINITE),
        }
    }
}

impl<'de> Deserialize<'de> for RequiredSampleSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SampleSizeVisitor;

        impl<'de> Visitor<'de> for SampleSizeVisitor {
            type Value = RequiredSampleSize;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a non-negative integer or \"{INFINITE}\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(RequiredSampleSize::Finite(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                u64::try_from(v)
                    .map(RequiredSampleSize::Finite)
                    .map_err(|_| E::custom("sample size cannot be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                if v == INFINITE {
                    Ok(RequiredSampleSize::Infinite)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(SampleSizeVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSizeKind {
    CohensH,
    CohensD,
}

impl std::fmt::Display for EffectSizeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CohensH => write!(f, "Cohen's h"),
            Self::CohensD => write!(f, "Cohen's d"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerResult {
    pub test: String,
    pub effect_size_kind: EffectSizeKind,
    pub effect_size: f64,
    pub required_sample_size_per_group: RequiredSampleSize,
    pub alpha: f64,
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerAnalysis {
    pub conversion_rate: PowerResult,
    pub time_spent: PowerResult,
    pub clicks: PowerResult,
    pub conversion_uplift_pct: f64,
    pub actual_sample_size_per_group: usize,
}

impl PowerAnalysis {
    pub fn results(&self) -> [(&'static str, &PowerResult); 3] {
        [
            ("conversion_rate", &self.conversion_rate),
            ("time_spent", &self.time_spent),
            ("clicks", &self.clicks),
        ]
    }
}

/// Relative change of the variant rate over control, in percent. 0 when the control rate is 0.
pub fn conversion_uplift(rate_control: f64, rate_variant: f64) -> f64 {
    if rate_control > 0.0 {
        (rate_variant - rate_control) / rate_control * 100.0
    } else {
        0.0
    }
}

/// Cohen's h for two proportions, in [0, π].
pub fn cohens_h(p1: f64, p2: f64) -> f64 {
    (2.0 * p2.sqrt().asin() - 2.0 * p1.sqrt().asin()).abs()
}

/// Cohen's d with the average-variance pooled std. 0 when both stds are 0.
pub fn cohens_d(mean1: f64, mean2: f64, std1: f64, std2: f64) -> f64 {
    let pooled_std = ((std1.powi(2) + std2.powi(2)) / 2.0).sqrt();
    if pooled_std > 0.0 {
        (mean2 - mean1).abs() / pooled_std
    } else {
        0.0
    }
}

fn z_sum(alpha: f64, power: f64) -> Result<f64> {
    check_probability("alpha", alpha)?;
    check_probability("power", power)?;
    Ok(normal_quantile(1.0 - alpha / 2.0) + normal_quantile(power))
}

/// Per-group n for a two-tailed two-proportion z-test.
pub fn sample_size_proportions(effect_h: f64, alpha: f64, power: f64) -> Result<RequiredSampleSize> {
    let z = z_sum(alpha, power)?;
    if effect_h == 0.0 {
        return Ok(RequiredSampleSize::Infinite);
    }
    Ok(RequiredSampleSize::from_real((z / effect_h).powi(2)))
}

/// Per-group n for a two-tailed two-sample t-test.
pub fn sample_size_means(cohens_d: f64, alpha: f64, power: f64) -> Result<RequiredSampleSize> {
    let z = z_sum(alpha, power)?;
    if cohens_d == 0.0 {
        return Ok(RequiredSampleSize::Infinite);
    }
    Ok(RequiredSampleSize::from_real(2.0 * (z / cohens_d).powi(2)))
}

pub fn power_analysis_conversion(
    p_control: f64,
    p_variant: f64,
    alpha: f64,
    power: f64,
) -> Result<PowerResult> {
    let effect_h = cohens_h(p_control, p_variant);
    let required = sample_size_proportions(effect_h, alpha, power)?;

    Ok(PowerResult {
        test: "Two-Proportion Z-Test".to_string(),
        effect_size_kind: EffectSizeKind::CohensH,
        effect_size: round_to(effect_h, 4),
        required_sample_size_per_group: required,
        alpha,
        power,
    })
}

pub fn power_analysis_ttest(
    mean1: f64,
    mean2: f64,
    std1: f64,
    std2: f64,
    metric: &str,
    alpha: f64,
    power: f64,
) -> Result<PowerResult> {
    let d = cohens_d(mean1, mean2, std1, std2);
    let required = sample_size_means(d, alpha, power)?;

    Ok(PowerResult {
        test: format!("Independent T-Test ({metric})"),
        effect_size_kind: EffectSizeKind::CohensD,
        effect_size: round_to(d, 4),
        required_sample_size_per_group: required,
        alpha,
        power,
    })
}

fn metric_power(
    dataset: &Dataset,
    metric: ContinuousMetric,
    alpha: f64,
    power: f64,
) -> Result<PowerResult> {
    let (control, variant) = dataset.partition()?;
    let c = SampleMoments::for_metric(&control, metric)?;
    let v = SampleMoments::for_metric(&variant, metric)?;
    power_analysis_ttest(c.mean, v.mean, c.std_dev(), v.std_dev(), metric.as_str(), alpha, power)
}

#[tracing::instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn run_power_analysis(dataset: &Dataset, alpha: f64, power: f64) -> Result<PowerAnalysis> {
    let (control, variant) = dataset.partition()?;
    let p_c = control.conversion_rate();
    let p_v = variant.conversion_rate();

    let analysis = PowerAnalysis {
        conversion_rate: power_analysis_conversion(p_c, p_v, alpha, power)?,
        time_spent: metric_power(dataset, ContinuousMetric::TimeSpent, alpha, power)?,
        clicks: metric_power(dataset, ContinuousMetric::Clicks, alpha, power)?,
        conversion_uplift_pct: round_to(conversion_uplift(p_c, p_v), 2),
        actual_sample_size_per_group: control.n(),
    };

    tracing::debug!(
        required_conversion = %analysis.conversion_rate.required_sample_size_per_group,
        actual = analysis.actual_sample_size_per_group,
        "Power analysis computed"
    );
    Ok(analysis)
}
