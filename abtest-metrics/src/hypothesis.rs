use abtest_core::{ContinuousMetric, CoreError, Dataset, Result};
use serde::{Deserialize, Serialize};

use crate::distributions::{normal_two_tailed_p, students_t_two_tailed_p};
use crate::power::conversion_uplift;
use crate::sample::{SampleMoments, WelchComparison};
use crate::{check_group_size, check_probability, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestType {
    #[serde(rename = "Two-Proportion Z-Test")]
    TwoProportionZTest,
    #[serde(rename = "Independent T-Test (Welch)")]
    WelchTTest,
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TwoProportionZTest => write!(f, "Two-Proportion Z-Test"),
            Self::WelchTTest => write!(f, "Independent T-Test (Welch)"),
        }
    }
}

/// Outcome of one two-tailed significance test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub metric: String,
    pub test_type: TestType,
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub alpha: f64,
    pub interpretation: String,
}

/// Raw two-proportion z-test numbers, before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionTest {
    pub z: f64,
    pub p_value: f64,
    pub rate_control: f64,
    pub rate_variant: f64,
    pub uplift_pct: f64,
}

/// Pooled two-proportion z-test of H0: p_control = p_variant.
///
/// `z` is positive when the variant converts better. A zero standard error
/// (both groups at 0% or both at 100%) gives `z = 0` and `p = 1`. Empty
/// groups and conversion counts above the group size are validation errors.
pub fn two_proportion_z(
    conversions_control: u64,
    n_control: usize,
    conversions_variant: u64,
    n_variant: usize,
) -> Result<ProportionTest> {
    check_group_size("n_control", n_control)?;
    check_group_size("n_variant", n_variant)?;
    for (name, conversions, n) in [
        ("conversions_control", conversions_control, n_control),
        ("conversions_variant", conversions_variant, n_variant),
    ] {
        if conversions > n as u64 {
            return Err(CoreError::Validation(format!(
                "{name} ({conversions}) exceeds the group size ({n})"
            )));
        }
    }

    let n_c = n_control as f64;
    let n_v = n_variant as f64;
    let rate_c = conversions_control as f64 / n_c;
    let rate_v = conversions_variant as f64 / n_v;

    let p_pool = (conversions_control + conversions_variant) as f64 / (n_c + n_v);
    let se = (p_pool * (1.0 - p_pool) * (1.0 / n_c + 1.0 / n_v)).sqrt();
    let z = if se > 0.0 { (rate_v - rate_c) / se } else { 0.0 };

    Ok(ProportionTest {
        z,
        p_value: normal_two_tailed_p(z),
        rate_control: rate_c,
        rate_variant: rate_v,
        uplift_pct: conversion_uplift(rate_c, rate_v),
    })
}

/// Raw Welch t-test numbers, before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanTest {
    pub t: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    pub mean_control: f64,
    pub mean_variant: f64,
}

/// Welch's unequal-variance t-test, variant minus control.
pub fn welch_t(control: &SampleMoments, variant: &SampleMoments) -> Result<MeanTest> {
    let welch = WelchComparison::new(control, variant);
    let (t, p_value) = if welch.standard_error > 0.0 {
        let t = welch.difference / welch.standard_error;
        (t, students_t_two_tailed_p(t, welch.degrees_of_freedom)?)
    } else {
        (0.0, 1.0)
    };

    Ok(MeanTest {
        t,
        degrees_of_freedom: welch.degrees_of_freedom,
        p_value,
        mean_control: control.mean,
        mean_variant: variant.mean,
    })
}

fn verdict(significant: bool) -> &'static str {
    if significant {
        "Statistically significant difference detected."
    } else {
        "No statistically significant difference detected."
    }
}

pub fn two_proportion_ztest(dataset: &Dataset, alpha: f64) -> Result<TestResult> {
    check_probability("alpha", alpha)?;
    let (control, variant) = dataset.partition()?;
    let test = two_proportion_z(control.conversions(), control.n(), variant.conversions(), variant.n())?;
    let significant = test.p_value < alpha;

    tracing::debug!(z = test.z, p_value = test.p_value, uplift = test.uplift_pct, "Two-proportion z-test");

    let interpretation = format!(
        "Conversion rate: Control={:.4} ({:.2}%), Variant={:.4} ({:.2}%). Uplift={:.2}%. {}",
        test.rate_control,
        test.rate_control * 100.0,
        test.rate_variant,
        test.rate_variant * 100.0,
        test.uplift_pct,
        verdict(significant),
    );

    Ok(TestResult {
        metric: "conversion_rate".to_string(),
        test_type: TestType::TwoProportionZTest,
        statistic: round_to(test.z, 4),
        p_value: round_to(test.p_value, 6),
        significant,
        alpha,
        interpretation,
    })
}

pub fn independent_ttest(dataset: &Dataset, metric: ContinuousMetric, alpha: f64) -> Result<TestResult> {
    check_probability("alpha", alpha)?;
    let (control, variant) = dataset.partition()?;
    let c = SampleMoments::for_metric(&control, metric)?;
    let v = SampleMoments::for_metric(&variant, metric)?;
    let test = welch_t(&c, &v)?;
    let significant = test.p_value < alpha;

    tracing::debug!(
        %metric,
        t = test.t,
        df = test.degrees_of_freedom,
        p_value = test.p_value,
        "Welch t-test"
    );

    let interpretation = format!(
        "{}: Control mean={:.4}, Variant mean={:.4}. Difference={:.4}. {}",
        metric,
        test.mean_control,
        test.mean_variant,
        test.mean_variant - test.mean_control,
        verdict(significant),
    );

    Ok(TestResult {
        metric: metric.as_str().to_string(),
        test_type: TestType::WelchTTest,
        statistic: round_to(test.t, 4),
        p_value: round_to(test.p_value, 6),
        significant,
        alpha,
        interpretation,
    })
}

/// The three tests of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisTests {
    pub conversion_rate: TestResult,
    pub time_spent: TestResult,
    pub clicks: TestResult,
}

impl HypothesisTests {
    pub fn results(&self) -> [(&'static str, &TestResult); 3] {
        [
            ("conversion_rate", &self.conversion_rate),
            ("time_spent", &self.time_spent),
            ("clicks", &self.clicks),
        ]
    }

    pub fn significant_count(&self) -> usize {
        self.results().iter().filter(|(_, r)| r.significant).count()
    }
}

#[tracing::instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn run_all_tests(dataset: &Dataset, alpha: f64) -> Result<HypothesisTests> {
    Ok(HypothesisTests {
        conversion_rate: two_proportion_ztest(dataset, alpha)?,
        time_spent: independent_ttest(dataset, ContinuousMetric::TimeSpent, alpha)?,
        clicks: independent_ttest(dataset, ContinuousMetric::Clicks, alpha)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_two_proportion_z_reference() {
        let test = two_proportion_z(1200, 10_000, 1480, 10_000).unwrap();
        assert_abs_diff_eq!(test.z, 5.8121, epsilon = 1e-3);
        assert!(test.p_value < 1e-4);
        assert_abs_diff_eq!(test.uplift_pct, 23.3333, epsilon = 1e-3);
    }

    #[test]
    fn test_two_proportion_z_sign_follows_variant() {
        let worse = two_proportion_z(200, 1000, 150, 1000).unwrap();
        assert!(worse.z < 0.0);
        assert!(worse.uplift_pct < 0.0);
    }

    #[test]
    fn test_two_proportion_zero_standard_error() {
        let none = two_proportion_z(0, 500, 0, 500).unwrap();
        assert_eq!(none.z, 0.0);
        assert_eq!(none.p_value, 1.0);
        assert_eq!(none.uplift_pct, 0.0);

        let all = two_proportion_z(500, 500, 300, 300).unwrap();
        assert_eq!(all.z, 0.0);
    }

    #[test]
    fn test_two_proportion_rejects_empty_groups() {
        assert!(matches!(two_proportion_z(0, 0, 5, 10), Err(CoreError::Validation(_))));
        assert!(matches!(two_proportion_z(5, 10, 0, 0), Err(CoreError::Validation(_))));
        assert!(two_proportion_z(11, 10, 5, 10).is_err());
    }

    #[test]
    fn test_welch_t_zero_variance() {
        let same = SampleMoments { n: 10, mean: 4.0, variance: 0.0 };
        let test = welch_t(&same, &same).unwrap();
        assert_eq!(test.t, 0.0);
        assert_eq!(test.p_value, 1.0);
    }

    #[test]
    fn test_test_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TestType::WelchTTest).unwrap(),
            "\"Independent T-Test (Welch)\""
        );
    }
}
