#![allow(dead_code)]

use abtest_core::{AnalysisConfig, Dataset, Group, Observation};
use abtest_metrics::Analyzer;
use abtest_report::AnalysisReport;
use chrono::NaiveDate;

fn rows(group: Group, n: usize, conversions: usize, time_offset: f64, clicks_offset: u64) -> Vec<Observation> {
    (0..n)
        .map(|i| {
            Observation::new(
                i as u64 + 1,
                group,
                i < conversions,
                4.0 + (i % 6) as f64 * 0.75 + time_offset,
                (i % 4) as u64 + clicks_offset,
                (i % 3) as u32 + 1,
                NaiveDate::from_ymd_opt(2024, 11, (i % 28) as u32 + 1).unwrap(),
            )
        })
        .collect()
}

pub fn sample_dataset() -> Dataset {
    let mut observations = rows(Group::Control, 1000, 100, 0.0, 0);
    observations.extend(rows(Group::Variant, 1000, 140, 0.6, 1));
    Dataset::new(observations)
}

pub fn sample_report() -> AnalysisReport {
    let dataset = sample_dataset();
    let analysis = Analyzer::new(AnalysisConfig::default())
        .unwrap()
        .analyze(&dataset)
        .unwrap();
    AnalysisReport::new(dataset.info(), analysis)
}
