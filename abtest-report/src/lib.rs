//! Report rendering and persistence for analysis runs.
//!
//! A run is wrapped in an [`AnalysisReport`] envelope and written as JSON
//! (`report.json`) and/or plain text (`report.txt`) into the directory named
//! by [`ReportConfig`]. Writes to the same path are serialized and atomic.

pub mod config;
pub mod error;
pub mod report;
pub mod text;
pub mod writer;

pub use config::{ReportConfig, ReportFormat};
pub use error::{ReportError, Result};
pub use report::AnalysisReport;
pub use text::render_text;
pub use writer::{PathLocks, ReportWriter, WrittenReport};
