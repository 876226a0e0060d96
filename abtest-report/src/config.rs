use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Txt,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 2] = [ReportFormat::Json, ReportFormat::Txt];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Json => "report.json",
            Self::Txt => "report.txt",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Txt => write!(f, "txt"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Where reports go and which encodings to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub formats: Vec<ReportFormat>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            formats: ReportFormat::ALL.to_vec(),
        }
    }
}

impl ReportConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_formats(mut self, formats: impl IntoIterator<Item = ReportFormat>) -> Self {
        self.formats = Vec::new();
        for format in formats {
            if !self.formats.contains(&format) {
                self.formats.push(format);
            }
        }
        self
    }

    pub fn path_for(&self, format: ReportFormat) -> PathBuf {
        self.output_dir.join(format.file_name())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("TXT".parse::<ReportFormat>().unwrap(), ReportFormat::Txt);
        assert_eq!("text".parse::<ReportFormat>().unwrap(), ReportFormat::Txt);
        assert!(matches!(
            "pdf".parse::<ReportFormat>(),
            Err(ReportError::UnknownFormat(f)) if f == "pdf"
        ));
    }

    #[test]
    fn test_with_formats_deduplicates() {
        let config = ReportConfig::new("out").with_formats([
            ReportFormat::Txt,
            ReportFormat::Json,
            ReportFormat::Txt,
        ]);
        assert_eq!(config.formats, vec![ReportFormat::Txt, ReportFormat::Json]);
        assert_eq!(config.path_for(ReportFormat::Txt), PathBuf::from("out/report.txt"));
    }

    #[test]
    fn test_default_writes_both_formats() {
        let config = ReportConfig::default();
        assert_eq!(config.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.formats.len(), 2);
    }
}
