#![allow(dead_code)]

use abtest_core::{Dataset, Group, Observation};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, day).unwrap()
}

/// Deterministic group: the first `conversions` users convert, engagement
/// cycles through a fixed pattern shifted by the given offsets.
pub fn group_rows(
    group: Group,
    n: usize,
    conversions: usize,
    time_offset: f64,
    clicks_offset: u64,
) -> Vec<Observation> {
    (0..n)
        .map(|i| {
            Observation::new(
                i as u64 + 1,
                group,
                i < conversions,
                5.0 + (i % 7) as f64 * 0.5 + time_offset,
                (i % 5) as u64 + clicks_offset,
                (i % 3) as u32 + 1,
                date((i % 30) as u32 + 1),
            )
        })
        .collect()
}

pub fn two_groups(
    n_control: usize,
    conversions_control: usize,
    n_variant: usize,
    conversions_variant: usize,
) -> Dataset {
    let mut rows = group_rows(Group::Control, n_control, conversions_control, 0.0, 0);
    rows.extend(group_rows(Group::Variant, n_variant, conversions_variant, 0.0, 0));
    Dataset::new(rows)
}

pub fn shifted_groups(
    n: usize,
    conversions_control: usize,
    conversions_variant: usize,
    time_offset: f64,
    clicks_offset: u64,
) -> Dataset {
    let mut rows = group_rows(Group::Control, n, conversions_control, 0.0, 0);
    rows.extend(group_rows(Group::Variant, n, conversions_variant, time_offset, clicks_offset));
    Dataset::new(rows)
}

/// Both groups drawn from the same process: Bernoulli(rate) conversions,
/// uniform time on site and clicks.
pub fn random_identical_groups(seed: u64, n: usize, rate: f64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(2 * n);
    for (offset, group) in [(0, Group::Control), (n, Group::Variant)] {
        for i in 0..n {
            rows.push(Observation::new(
                (offset + i) as u64 + 1,
                group,
                rng.gen_bool(rate),
                rng.gen_range(0.0..20.0),
                rng.gen_range(0..10),
                rng.gen_range(1..5),
                date(rng.gen_range(1..=30)),
            ));
        }
    }
    Dataset::new(rows)
}
