mod common;

use std::fs;
use std::sync::Arc;

use abtest_report::*;
use common::*;
use pretty_assertions::assert_eq;

// ===== Writes =====

#[test]
fn test_write_all_formats() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("outputs");
    let writer = ReportWriter::with_locks(ReportConfig::new(&out), Arc::new(PathLocks::new()));
    let report = sample_report();

    let written = writer.write(&report).unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(written[0].format, ReportFormat::Json);
    assert_eq!(written[1].format, ReportFormat::Txt);
    assert!(written[0].path.ends_with("report.json"));
    assert!(written[1].path.ends_with("report.txt"));

    let loaded = AnalysisReport::load(&written[0].path).unwrap();
    assert_eq!(loaded, report);

    let text = fs::read_to_string(&written[1].path).unwrap();
    assert_eq!(text, render_text(&report));
}

#[test]
fn test_write_selected_format_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReportConfig::new(dir.path()).with_formats([ReportFormat::Txt]);
    let writer = ReportWriter::new(config);

    let written = writer.write(&sample_report()).unwrap();

    assert_eq!(written.len(), 1);
    assert!(dir.path().join("report.txt").exists());
    assert!(!dir.path().join("report.json").exists());
}

#[test]
fn test_write_without_formats() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(ReportConfig::new(dir.path()).with_formats([]));
    assert!(matches!(
        writer.write(&sample_report()),
        Err(ReportError::NoFormats)
    ));
}

#[test]
fn test_rewrite_replaces_previous_report() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(ReportConfig::new(dir.path()));
    let first = sample_report();
    let second = sample_report();

    writer.write_format(&first, ReportFormat::Json).unwrap();
    let path = writer.write_format(&second, ReportFormat::Json).unwrap();

    assert_eq!(AnalysisReport::load(&path).unwrap().run_id, second.run_id);
    // Only the report itself is left behind, no temporary siblings.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_output_dir_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("outputs");
    fs::write(&blocker, "not a directory").unwrap();

    let writer = ReportWriter::new(ReportConfig::new(&blocker));
    assert!(matches!(
        writer.write(&sample_report()),
        Err(ReportError::Write { .. })
    ));
}

// ===== Concurrency =====

#[test]
fn test_concurrent_writers_same_path() {
    let dir = tempfile::tempdir().unwrap();
    let locks = Arc::new(PathLocks::new());
    let reports: Vec<AnalysisReport> = (0..8).map(|_| sample_report()).collect();

    std::thread::scope(|scope| {
        for report in &reports {
            let locks = Arc::clone(&locks);
            let out = dir.path().to_path_buf();
            scope.spawn(move || {
                let writer = ReportWriter::with_locks(ReportConfig::new(out), locks);
                for _ in 0..5 {
                    writer.write(report).unwrap();
                }
            });
        }
    });

    // Every writer targeted the same two files.
    assert_eq!(locks.len(), 2);

    let loaded = AnalysisReport::load(dir.path().join("report.json")).unwrap();
    assert!(reports.iter().any(|r| r == &loaded));

    let text = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(reports.iter().any(|r| render_text(r) == text));

    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 2);
}
