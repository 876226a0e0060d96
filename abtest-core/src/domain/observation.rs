use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::group::Group;

/// One user's record in the experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Opaque identifier; the 1-based row number when the column is absent.
    pub user_id: String,
    pub group: Group,
    pub converted: bool,
    /// Minutes on site; `None` when the value was missing.
    pub time_spent: Option<f64>,
    pub clicks: Option<u64>,
    pub session_count: u32,
    pub date: NaiveDate,
}

impl Observation {
    pub fn new(
        user_id: impl ToString,
        group: Group,
        converted: bool,
        time_spent: f64,
        clicks: u64,
        session_count: u32,
        date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            group,
            converted,
            time_spent: Some(time_spent),
            clicks: Some(clicks),
            session_count,
            date,
        }
    }

    /// Value of a continuous metric, or `None` if it is missing.
    pub fn metric(&self, metric: ContinuousMetric) -> Option<f64> {
        match metric {
            ContinuousMetric::TimeSpent => self.time_spent.filter(|v| !v.is_nan()),
            ContinuousMetric::Clicks => self.clicks.map(|c| c as f64),
        }
    }
}

/// Engagement metrics compared with Welch's t-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuousMetric {
    TimeSpent,
    Clicks,
}

impl ContinuousMetric {
    pub const ALL: [ContinuousMetric; 2] = [ContinuousMetric::TimeSpent, ContinuousMetric::Clicks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeSpent => "time_spent",
            Self::Clicks => "clicks",
        }
    }
}

impl std::fmt::Display for ContinuousMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
