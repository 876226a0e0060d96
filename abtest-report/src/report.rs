use std::fs;
use std::path::Path;

use abtest_core::DatasetInfo;
use abtest_metrics::AbTestAnalysis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ReportError, Result};

/// One analysis run as it is persisted. The analysis keys sit at the top level
/// next to the run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub dataset_info: DatasetInfo,
    #[serde(flatten)]
    pub analysis: AbTestAnalysis,
}

impl AnalysisReport {
    pub fn new(dataset_info: DatasetInfo, analysis: AbTestAnalysis) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            dataset_info,
            analysis,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Read a previously written `report.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }
}
