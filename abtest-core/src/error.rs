use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Group;

/// Problems with the input dataset itself. Any of these aborts an analysis run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Group '{0}' has no observations")]
    EmptyGroup(Group),

    #[error("Invalid value {value:?} in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("Unknown group label {label:?} at row {row}")]
    UnknownGroup { label: String, row: usize },

    #[error(
        "Insufficient data for '{metric}' in group '{group}': \
         {available} non-missing value(s), need at least {required}"
    )]
    InsufficientData {
        metric: String,
        group: Group,
        available: usize,
        required: usize,
    },

    #[error("Malformed input: {0}")]
    Malformed(String),
}

/// The computation an analysis failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    MetricsSummary,
    HypothesisTests,
    ConfidenceIntervals,
    PowerAnalysis,
}

impl AnalysisStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetricsSummary => "metrics_summary",
            Self::HypothesisTests => "hypothesis_tests",
            Self::ConfidenceIntervals => "confidence_intervals",
            Self::PowerAnalysis => "power_analysis",
        }
    }
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{stage} failed: {source}")]
    Analysis {
        stage: AnalysisStage,
        source: Box<CoreError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Attribute this error to an analysis stage.
    pub fn in_stage(self, stage: AnalysisStage) -> Self {
        CoreError::Analysis {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage this error was raised in, if it was attributed to one.
    pub fn stage(&self) -> Option<AnalysisStage> {
        match self {
            CoreError::Analysis { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost data error, looking through stage attribution.
    pub fn data_error(&self) -> Option<&DataError> {
        match self {
            CoreError::Data(err) => Some(err),
            CoreError::Analysis { source, .. } => source.data_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Data(DataError::Malformed(err.to_string()))
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        CoreError::Validation(err.to_string())
    }
}
