//! Table views of analysis results

use abtest_metrics::{
    BusinessInsights, ConfidenceIntervals, HypothesisTests, MetricsSummary, PowerAnalysis,
};
use abtest_report::AnalysisReport;
use colored::Colorize;
use comfy_table::Cell;

use crate::output::{
    format_p_value, format_pct, new_table, print_field, print_section, recommendation_badge,
    significance_badge, TableDisplay,
};

impl TableDisplay for AnalysisReport {
    fn display_table(&self) {
        let info = &self.dataset_info;
        print_section("Dataset");
        print_field("Run ID", &self.run_id.to_string());
        print_field(
            "Generated",
            &self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        print_field("Rows", &info.total_rows.to_string());
        print_field("Columns", &info.columns.join(", "));
        print_field("Date range", &info.date_range);
        if info.dropped_rows > 0 {
            print_field("Dropped rows", &info.dropped_rows.to_string().yellow().to_string());
        }

        let analysis = &self.analysis;
        analysis.metrics_summary.display_table();
        print_hypothesis_tests(&analysis.hypothesis_tests);
        print_confidence_intervals(&analysis.confidence_intervals);
        print_power_analysis(&analysis.power_analysis);
        print_insights(&analysis.business_insights);
    }
}

impl TableDisplay for MetricsSummary {
    fn display_table(&self) {
        let (c, v, d) = (&self.control, &self.variant, &self.differences);
        print_section("Metrics Summary");

        let mut table = new_table(&["Metric", "Control", "Variant", "Difference"]);
        table.add_row(vec![
            Cell::new("Users"),
            Cell::new(c.n_users),
            Cell::new(v.n_users),
            Cell::new("-"),
        ]);
        table.add_row(vec![
            Cell::new("Conversions"),
            Cell::new(c.total_conversions),
            Cell::new(v.total_conversions),
            Cell::new("-"),
        ]);
        table.add_row(vec![
            Cell::new("Conversion rate"),
            Cell::new(format_pct(c.conversion_rate)),
            Cell::new(format_pct(v.conversion_rate)),
            Cell::new(format_pct(d.conversion_rate_diff)),
        ]);
        table.add_row(vec![
            Cell::new("Avg time spent (min)"),
            Cell::new(format!("{:.4}", c.avg_time_spent)),
            Cell::new(format!("{:.4}", v.avg_time_spent)),
            Cell::new(format!("{:+.4}", d.time_spent_diff)),
        ]);
        table.add_row(vec![
            Cell::new("Avg clicks"),
            Cell::new(format!("{:.4}", c.avg_clicks)),
            Cell::new(format!("{:.4}", v.avg_clicks)),
            Cell::new(format!("{:+.4}", d.clicks_diff)),
        ]);
        table.add_row(vec![
            Cell::new("Avg sessions"),
            Cell::new(format!("{:.4}", c.avg_session_count)),
            Cell::new(format!("{:.4}", v.avg_session_count)),
            Cell::new("-"),
        ]);
        println!("{table}");
    }
}

fn print_hypothesis_tests(tests: &HypothesisTests) {
    print_section("Hypothesis Tests");
    let mut table = new_table(&["Metric", "Test", "Statistic", "P-value", "Significant"]);
    for (key, result) in tests.results() {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(result.test_type),
            Cell::new(format!("{:.4}", result.statistic)),
            Cell::new(format_p_value(result.p_value)),
            Cell::new(significance_badge(result.significant)),
        ]);
    }
    println!("{table}");
    for (_, result) in tests.results() {
        println!("  {}", result.interpretation.dimmed());
    }
}

fn print_confidence_intervals(intervals: &ConfidenceIntervals) {
    let level = intervals.conversion_rate.confidence_level * 100.0;
    print_section(&format!("Confidence Intervals ({level:.0}%)"));
    let mut table = new_table(&["Metric", "Lower", "Estimate", "Upper", "Excludes 0"]);
    for (_, ci) in intervals.intervals() {
        table.add_row(vec![
            Cell::new(&ci.metric),
            Cell::new(ci.lower),
            Cell::new(ci.point_estimate),
            Cell::new(ci.upper),
            Cell::new(significance_badge(ci.excludes_zero())),
        ]);
    }
    println!("{table}");
}

fn print_power_analysis(power: &PowerAnalysis) {
    print_section("Power Analysis");
    let mut table = new_table(&["Metric", "Test", "Effect size", "Required n/group"]);
    for (key, result) in power.results() {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(&result.test),
            Cell::new(format!("{} = {}", result.effect_size_kind, result.effect_size)),
            Cell::new(result.required_sample_size_per_group),
        ]);
    }
    println!("{table}");
    print_field("Conversion uplift", &format!("{:.2}%", power.conversion_uplift_pct));
    print_field(
        "Actual n/group",
        &power.actual_sample_size_per_group.to_string(),
    );
}

fn print_insights(insights: &BusinessInsights) {
    print_section("Recommendation");
    println!("  {}", recommendation_badge(insights.recommendation));
    println!("  {}", insights.rationale);
    print_field(
        "Significant metrics",
        &format!(
            "{}/{}",
            insights.significant_metrics, insights.total_metrics_tested
        ),
    );
    for insight in &insights.insights {
        println!("    • {insight}");
    }
}
