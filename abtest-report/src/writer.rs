use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use dashmap::DashMap;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::config::{ReportConfig, ReportFormat};
use crate::error::{ReportError, Result};
use crate::report::AnalysisReport;
use crate::text::render_text;

/// Registry of per-path write locks. Two writers holding the same registry
/// never interleave on one output file.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by every [`ReportWriter::new`].
    pub fn global() -> Arc<PathLocks> {
        static GLOBAL: OnceLock<Arc<PathLocks>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(PathLocks::new())))
    }

    /// Gets or creates the lock guarding `path`
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let entry = self.locks.entry(path.to_path_buf()).or_default();
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// A file produced by [`ReportWriter::write`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenReport {
    pub format: ReportFormat,
    pub path: PathBuf,
}

pub struct ReportWriter {
    config: ReportConfig,
    locks: Arc<PathLocks>,
}

impl ReportWriter {
    pub fn new(config: ReportConfig) -> Self {
        Self::with_locks(config, PathLocks::global())
    }

    pub fn with_locks(config: ReportConfig, locks: Arc<PathLocks>) -> Self {
        Self { config, locks }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn render(report: &AnalysisReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => report.to_json_pretty(),
            ReportFormat::Txt => Ok(render_text(report)),
        }
    }

    /// Write every configured format, in configuration order.
    pub fn write(&self, report: &AnalysisReport) -> Result<Vec<WrittenReport>> {
        if self.config.formats.is_empty() {
            return Err(ReportError::NoFormats);
        }
        self.config
            .formats
            .iter()
            .map(|&format| {
                let path = self.write_format(report, format)?;
                Ok(WrittenReport { format, path })
            })
            .collect()
    }

    /// Render one format and atomically replace its file.
    pub fn write_format(&self, report: &AnalysisReport, format: ReportFormat) -> Result<PathBuf> {
        let contents = Self::render(report, format)?;
        let dir = self.ensure_output_dir()?;
        let path = dir.join(format.file_name());
        self.write_atomic(&path, contents.as_bytes())?;

        tracing::info!(
            run_id = %report.run_id,
            format = %format,
            path = %path.display(),
            "Report written"
        );
        Ok(path)
    }

    fn ensure_output_dir(&self) -> Result<PathBuf> {
        let dir = &self.config.output_dir;
        let write_err = |source: std::io::Error| ReportError::Write {
            path: dir.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(write_err)?;
        dir.canonicalize().map_err(write_err)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let lock = self.locks.lock_for(path);
        // Files are only ever replaced by rename, so a poisoned lock still guards a whole file.
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let write_err = |source: std::io::Error| ReportError::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "Persisted report file");
        Ok(())
    }
}
