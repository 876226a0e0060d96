//! Plain-text rendering of a report.

use crate::report::AnalysisReport;

const WIDTH: usize = 70;

fn rule(c: char) -> String {
    std::iter::repeat(c).take(WIDTH).collect()
}

fn section(title: &str) -> String {
    let head = format!("── {title} ");
    let fill = WIDTH.saturating_sub(head.chars().count());
    format!("{head}{}", "─".repeat(fill))
}

fn significance(significant: bool) -> &'static str {
    if significant {
        "SIGNIFICANT"
    } else {
        "NOT SIGNIFICANT"
    }
}

/// Render the report as the fixed-width text layout written to `report.txt`.
pub fn render_text(report: &AnalysisReport) -> String {
    let analysis = &report.analysis;
    let metrics = &analysis.metrics_summary;
    let (control, variant, diff) = (&metrics.control, &metrics.variant, &metrics.differences);
    let power = &analysis.power_analysis;
    let insights = &analysis.business_insights;

    let mut lines = vec![
        rule('='),
        "       A/B TESTING ANALYSIS REPORT".to_string(),
        format!(
            "       Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        format!("       Run ID   : {}", report.run_id),
        rule('='),
        String::new(),
        section("DATASET SUMMARY"),
        format!("  Total Users     : {}", report.dataset_info.total_rows),
        format!("  Control Users   : {}", control.n_users),
        format!("  Variant Users   : {}", variant.n_users),
        format!("  Date Range      : {}", report.dataset_info.date_range),
    ];
    if report.dataset_info.dropped_rows > 0 {
        lines.push(format!("  Dropped Rows    : {}", report.dataset_info.dropped_rows));
    }

    lines.extend([
        String::new(),
        section("METRICS SUMMARY"),
        format!("  {:<25} {:>12} {:>12} {:>12}", "Metric", "Control", "Variant", "Difference"),
        format!("  {}", "-".repeat(62)),
        format!(
            "  {:<25} {:>11.2}% {:>11.2}% {:>11.2}%",
            "Conversion Rate",
            control.conversion_rate * 100.0,
            variant.conversion_rate * 100.0,
            diff.conversion_rate_diff * 100.0,
        ),
        format!(
            "  {:<25} {:>12.4} {:>12.4} {:>12.4}",
            "Avg Time Spent (min)", control.avg_time_spent, variant.avg_time_spent, diff.time_spent_diff,
        ),
        format!(
            "  {:<25} {:>12.4} {:>12.4} {:>12.4}",
            "Avg Clicks", control.avg_clicks, variant.avg_clicks, diff.clicks_diff,
        ),
        String::new(),
        section("HYPOTHESIS TEST RESULTS"),
    ]);

    for (key, result) in analysis.hypothesis_tests.results() {
        lines.extend([
            format!("  Metric   : {key}"),
            format!("  Test     : {}", result.test_type),
            format!("  Statistic: {}", result.statistic),
            format!("  P-value  : {}", result.p_value),
            format!(
                "  Result   : {} (alpha={})",
                significance(result.significant),
                result.alpha
            ),
            format!("  Notes    : {}", result.interpretation),
            String::new(),
        ]);
    }

    let level = analysis.confidence_intervals.conversion_rate.confidence_level * 100.0;
    lines.push(section(&format!("CONFIDENCE INTERVALS ({level:.0}%)")));
    for (key, ci) in analysis.confidence_intervals.intervals() {
        lines.push(format!(
            "  {key}: [{}, {}]  Point estimate: {}",
            ci.lower, ci.upper, ci.point_estimate
        ));
    }

    lines.extend([
        String::new(),
        section("POWER ANALYSIS"),
        format!("  Conversion Rate Uplift: {}%", power.conversion_uplift_pct),
        format!("  Actual sample per group: {}", power.actual_sample_size_per_group),
    ]);
    for (key, result) in power.results() {
        let label = format!("Required ({key}):");
        lines.push(format!(
            "  {label:<23}{} ({} = {})",
            result.required_sample_size_per_group, result.effect_size_kind, result.effect_size
        ));
    }

    lines.extend([String::new(), section("BUSINESS INSIGHTS")]);
    lines.extend(insights.insights.iter().map(|insight| format!("  • {insight}")));

    lines.extend([
        String::new(),
        section("FINAL RECOMMENDATION"),
        format!("  >>> {} <<<", insights.recommendation),
        format!("  {}", insights.rationale),
        format!(
            "  Significant metrics: {}/{}",
            insights.significant_metrics, insights.total_metrics_tested
        ),
        String::new(),
        rule('='),
    ]);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_pads_to_width() {
        let header = section("POWER ANALYSIS");
        assert!(header.starts_with("── POWER ANALYSIS ─"));
        assert_eq!(header.chars().count(), WIDTH);
    }

    #[test]
    fn test_rule_width() {
        assert_eq!(rule('=').len(), WIDTH);
    }
}
