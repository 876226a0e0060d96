mod common;

use abtest_core::{Dataset, Group};
use abtest_metrics::*;
use common::*;
use pretty_assertions::assert_eq;
use test_case::test_case;

// ===== Decision Rules =====

#[test_case(true, 3, 40.0, Recommendation::Rollout ; "all metrics improve")]
#[test_case(true, 2, 1.0, Recommendation::Rollout ; "two metrics with small lift")]
#[test_case(true, 1, 23.33, Recommendation::Rollout ; "conversion alone with practical lift")]
#[test_case(true, 1, 5.0, Recommendation::Monitor ; "lift at the practical threshold")]
#[test_case(true, 1, 3.0, Recommendation::Monitor ; "conversion alone with small lift")]
#[test_case(true, 2, -10.0, Recommendation::Monitor ; "significant conversion drop")]
#[test_case(false, 1, 0.5, Recommendation::DoNotRollout ; "engagement only")]
#[test_case(false, 2, 0.5, Recommendation::Monitor ; "two engagement metrics")]
#[test_case(false, 0, 0.0, Recommendation::Monitor ; "nothing significant")]
fn test_decision_table(
    conversion_significant: bool,
    significant_metrics: usize,
    uplift_pct: f64,
    expected: Recommendation,
) {
    let (recommendation, rationale) = decide(conversion_significant, significant_metrics, uplift_pct);
    assert_eq!(recommendation, expected);
    assert!(!rationale.is_empty());
}

#[test]
fn test_rationale_texts() {
    let (_, multi) = decide(true, 3, 12.0);
    assert!(multi.starts_with("Multiple metrics show statistically significant improvement"));

    let (_, engagement) = decide(false, 1, 0.0);
    assert!(engagement.contains("Engagement improvements alone do not justify a full rollout"));

    let (_, mixed) = decide(false, 0, 0.0);
    assert!(mixed.starts_with("Results are mixed."));
}

#[test]
fn test_decision_is_deterministic() {
    let first = decide(true, 1, 7.5);
    for _ in 0..10 {
        assert_eq!(decide(true, 1, 7.5), first);
    }
}

// ===== Insights =====

fn insights_for(dataset: &Dataset) -> BusinessInsights {
    let metrics = compute_metrics_summary(dataset).unwrap();
    let tests = run_all_tests(dataset, 0.05).unwrap();
    let power = run_power_analysis(dataset, 0.05, 0.80).unwrap();
    generate_business_insights(&metrics, &tests, &power)
}

#[test]
fn test_insights_for_improving_variant() {
    let insights = insights_for(&shifted_groups(1000, 100, 140, 0.8, 1));

    assert_eq!(insights.recommendation, Recommendation::Rollout);
    assert_eq!(insights.significant_metrics, 3);
    assert_eq!(insights.total_metrics_tested, TOTAL_METRICS_TESTED);
    assert_eq!(insights.insights.len(), 3);
    assert!(insights.insights[0].contains("significant lift of 40.00%"));
    assert!(insights.insights[0].contains("(10.00% → 14.00%)"));
    assert!(insights.insights[1].contains("0.80 more minutes"));
    assert!(insights.insights[2].contains("1.00 more clicks"));
}

#[test]
fn test_insights_for_regressing_engagement() {
    // Control carries the engagement offset, so the variant trails on both metrics.
    let mut rows = group_rows(Group::Control, 1000, 100, 0.8, 1);
    rows.extend(group_rows(Group::Variant, 1000, 100, 0.0, 0));
    let insights = insights_for(&Dataset::new(rows));

    assert!(insights.insights[0].starts_with("Conversion rate difference is not statistically significant"));
    assert!(insights.insights[1].contains("0.80 fewer minutes"));
    assert!(insights.insights[1].contains("reduced engagement"));
    assert!(insights.insights[2].contains("1.00 fewer clicks"));
    assert_eq!(insights.recommendation, Recommendation::Monitor);
}

#[test]
fn test_insights_without_significance() {
    let insights = insights_for(&two_groups(2000, 240, 2000, 240));

    assert_eq!(insights.insights.len(), 1);
    assert_eq!(insights.significant_metrics, 0);
    assert_eq!(insights.recommendation, Recommendation::Monitor);
}

#[test]
fn test_insights_serialize_recommendation_label() {
    let insights = insights_for(&shifted_groups(1000, 100, 100, 1.0, 0));
    let json = serde_json::to_value(&insights).unwrap();

    assert_eq!(json["recommendation"], "DO NOT ROLLOUT");
    assert_eq!(json["significant_metrics"], 1);
    assert_eq!(json["total_metrics_tested"], 3);
}
