mod common;

use abtest_core::{ContinuousMetric, Dataset, Group, Observation};
use abtest_metrics::*;
use approx::assert_abs_diff_eq;
use common::*;
use proptest::prelude::*;

// ===== Proportion Difference =====

#[test]
fn test_conversion_interval_from_dataset() {
    let dataset = two_groups(10_000, 1200, 10_000, 1480);
    let ci = ci_difference_proportions(&dataset, 0.95).unwrap();

    assert_eq!(ci.metric, "conversion_rate_difference");
    assert_eq!(ci.confidence_level, 0.95);
    assert_abs_diff_eq!(ci.point_estimate, 0.028, epsilon = 1e-9);
    assert_abs_diff_eq!(ci.lower, 0.018566, epsilon = 1e-6);
    assert_abs_diff_eq!(ci.upper, 0.037434, epsilon = 1e-6);
}

#[test]
fn test_conversion_interval_six_decimals() {
    let dataset = two_groups(997, 101, 1003, 133);
    let ci = ci_difference_proportions(&dataset, 0.95).unwrap();

    for value in [ci.lower, ci.upper, ci.point_estimate] {
        assert_eq!(value, (value * 1e6).round() / 1e6);
    }
}

#[test]
fn test_interval_width_increases_with_confidence() {
    let dataset = shifted_groups(400, 40, 48, 0.3, 0);

    let ci_90 = ci_difference_means(&dataset, ContinuousMetric::TimeSpent, 0.90).unwrap();
    let ci_95 = ci_difference_means(&dataset, ContinuousMetric::TimeSpent, 0.95).unwrap();
    let ci_99 = ci_difference_means(&dataset, ContinuousMetric::TimeSpent, 0.99).unwrap();

    assert!(ci_95.width() > ci_90.width());
    assert!(ci_99.width() > ci_95.width());

    let p_90 = ci_difference_proportions(&dataset, 0.90).unwrap();
    let p_99 = ci_difference_proportions(&dataset, 0.99).unwrap();
    assert!(p_99.width() > p_90.width());
}

// ===== Mean Difference =====

#[test]
fn test_mean_interval_reference() {
    // Control [1..=5], variant [2, 4, 6, 8, 10]: diff 3, se 1.5811, df 5.882, t_crit 2.4588
    let rows: Vec<Observation> = (1..=5)
        .map(|i| Observation::new(i, Group::Control, false, i as f64, i, 1, date(1)))
        .chain((1..=5).map(|i| {
            Observation::new(10 + i, Group::Variant, false, (2 * i) as f64, 2 * i, 1, date(1))
        }))
        .collect();
    let dataset = Dataset::new(rows);
    let ci = ci_difference_means(&dataset, ContinuousMetric::TimeSpent, 0.95).unwrap();

    assert_eq!(ci.metric, "time_spent_difference");
    assert_eq!(ci.point_estimate, 3.0);
    assert_abs_diff_eq!(ci.lower, -0.8877, epsilon = 1e-3);
    assert_abs_diff_eq!(ci.upper, 6.8877, epsilon = 1e-3);
    assert!(ci.contains(0.0));
}

#[test]
fn test_mean_interval_four_decimals() {
    let dataset = shifted_groups(333, 30, 30, 0.123_456, 0);
    let ci = ci_difference_means(&dataset, ContinuousMetric::TimeSpent, 0.95).unwrap();

    for value in [ci.lower, ci.upper, ci.point_estimate] {
        assert_eq!(value, (value * 1e4).round() / 1e4);
    }
    assert_eq!(ci.point_estimate, 0.1235);
}

#[test]
fn test_compute_all_cis_keys() {
    let dataset = shifted_groups(500, 50, 60, 0.5, 1);
    let cis = compute_all_cis(&dataset, 0.95).unwrap();

    assert_eq!(cis.conversion_rate.metric, "conversion_rate_difference");
    assert_eq!(cis.time_spent.metric, "time_spent_difference");
    assert_eq!(cis.clicks.metric, "clicks_difference");
    assert!(cis.time_spent.excludes_zero());
    assert!(cis.clicks.excludes_zero());
}

#[test]
fn test_compute_all_cis_propagates_data_errors() {
    let dataset = Dataset::new(group_rows(Group::Variant, 10, 1, 0.0, 0));
    assert!(compute_all_cis(&dataset, 0.95).is_err());
}

// ===== Ordering Invariant =====

fn observations(group: Group) -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(
        (any::<bool>(), 0.0f64..120.0, 0u64..50, 1u32..10),
        2..80,
    )
    .prop_map(move |rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (converted, time, clicks, sessions))| {
                Observation::new(i as u64, group, converted, time, clicks, sessions, date(1))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_intervals_contain_point_estimate(
        control in observations(Group::Control),
        variant in observations(Group::Variant),
        confidence in 0.5f64..0.999,
    ) {
        let mut rows = control;
        rows.extend(variant);
        let dataset = Dataset::new(rows);

        let cis = compute_all_cis(&dataset, confidence).unwrap();
        for (_, ci) in cis.intervals() {
            prop_assert!(ci.lower <= ci.point_estimate, "{ci:?}");
            prop_assert!(ci.point_estimate <= ci.upper, "{ci:?}");
            prop_assert_eq!(ci.confidence_level, confidence);
        }
    }
}
