use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Experiment arm a user was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Control,
    Variant,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::Control, Group::Variant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Variant => "variant",
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = String;

    /// Labels match exactly; `"Control"` is not a control row. The dataset
    /// loaders trim whitespace before parsing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "control" => Ok(Self::Control),
            "variant" => Ok(Self::Variant),
            other => Err(format!("unknown group label: {other}")),
        }
    }
}

/// What to do with rows whose group label is neither `control` nor `variant`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPolicy {
    /// Drop the row and count it in `DatasetInfo::dropped_rows`.
    #[default]
    Ignore,
    /// Fail the load with `DataError::UnknownGroup`.
    Reject,
}

impl std::fmt::Display for GroupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for GroupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown group policy: {other}")),
        }
    }
}
