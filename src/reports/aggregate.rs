use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::naming::{is_report_file_name, timestamp_from_file_name};
use super::reader::read_report;
use crate::models::{AggregateRow, ReportSummary};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// What to do with a report that cannot be read or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail the whole aggregation with the offending file as context.
    #[default]
    Abort,
    /// Log a warning and leave the file out of the table.
    Skip,
}

/// Report files in `dir`, oldest first. A missing directory has no reports.
fn report_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to list reports in {}", dir.display()))
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to list reports in {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_report_file_name(name) {
            continue;
        }
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            files.push(entry.path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Report files newest first.
pub fn list_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = report_files(dir)?;
    files.reverse();
    Ok(files)
}

pub fn latest_report(dir: &Path) -> Result<Option<PathBuf>> {
    Ok(report_files(dir)?.pop())
}

/// Counts for one report. `failed` is the complement of `passed`, so any
/// status other than `PASS` counts as a failure.
pub fn aggregate_file(path: &Path) -> Result<AggregateRow> {
    let table = read_report(path)?;
    let total = table.len() as u64;
    let passed = table
        .column("status")
        .context("report has no status column")?
        .filter(|status| *status == "PASS")
        .count() as u64;

    let ts = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(timestamp_from_file_name)
        .unwrap_or_default();

    Ok(AggregateRow {
        file: path.to_path_buf(),
        ts,
        total,
        passed,
        failed: total - passed,
    })
}

/// One row per report in `dir`, in file name (and so chronological) order.
pub fn aggregate(dir: &Path, policy: MalformedPolicy) -> Result<Vec<AggregateRow>> {
    let files = report_files(dir)?;
    let mut rows = Vec::with_capacity(files.len());

    for file in files {
        match aggregate_file(&file) {
            Ok(row) => {
                log_info!(
                    "aggregated {}: {} total, {} passed",
                    file.display(),
                    row.total,
                    row.passed
                );
                rows.push(row);
            }
            Err(err) => match policy {
                MalformedPolicy::Skip => {
                    log_warn!("skipping report {}: {err:#}", file.display());
                }
                MalformedPolicy::Abort => {
                    log_error!("aggregation aborted at {}", file.display());
                    return Err(err);
                }
            },
        }
    }

    Ok(rows)
}

/// KPIs for a single report.
pub fn summarize_report(path: &Path) -> Result<ReportSummary> {
    let table = read_report(path)?;
    let total = table.len() as u64;

    let (mut passed, mut failed) = (0u64, 0u64);
    if let Some(statuses) = table.column("status") {
        for status in statuses {
            match status {
                "PASS" => passed += 1,
                "FAIL" => failed += 1,
                _ => {}
            }
        }
    }

    let pass_rate = if total == 0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", 100.0 * passed as f64 / total as f64)
    };

    let last_timestamp = table.column("timestamp_utc").and_then(|values| {
        values
            .filter(|v| !v.is_empty())
            .max()
            .map(str::to_string)
    });

    let readings: Vec<f64> = table
        .column("reading")
        .map(|values| values.filter_map(|v| v.trim().parse::<f64>().ok()).collect())
        .unwrap_or_default();
    let reading_min = readings.iter().copied().reduce(f64::min);
    let reading_max = readings.iter().copied().reduce(f64::max);
    let reading_mean = if readings.is_empty() {
        None
    } else {
        Some(readings.iter().sum::<f64>() / readings.len() as f64)
    };

    Ok(ReportSummary {
        file: path.to_path_buf(),
        total,
        passed,
        failed,
        pass_rate,
        last_timestamp,
        reading_min,
        reading_max,
        reading_mean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str = "test_id,reading,status,timestamp_utc";

    fn write_report(dir: &Path, name: &str, statuses: &[&str]) -> PathBuf {
        let mut text = format!("{HEADER}\n");
        for (i, status) in statuses.iter().enumerate() {
            text.push_str(&format!(
                "{},{}.5,{status},2025-01-01T00:00:0{}.000000Z\n",
                i + 1,
                20 + i,
                i % 10
            ));
        }
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn two_reports_aggregate_in_file_name_order() {
        let dir = tempdir().unwrap();
        write_report(
            dir.path(),
            "test_results_20250102T000000Z.csv",
            &["PASS", "PASS", "PASS"],
        );
        write_report(
            dir.path(),
            "test_results_20250101T000000Z.csv",
            &["PASS", "PASS", "FAIL", "PASS", "PASS"],
        );

        let rows = aggregate(dir.path(), MalformedPolicy::Abort).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ts, "20250101T000000Z");
        assert_eq!((rows[0].total, rows[0].passed, rows[0].failed), (5, 4, 1));
        assert_eq!(rows[1].ts, "20250102T000000Z");
        assert_eq!((rows[1].total, rows[1].passed, rows[1].failed), (3, 3, 0));
        assert_eq!(
            rows[0].file,
            dir.path().join("test_results_20250101T000000Z.csv")
        );
    }

    #[test]
    fn unknown_statuses_count_as_failed() {
        let dir = tempdir().unwrap();
        let path = write_report(
            dir.path(),
            "test_results_20250101T000000Z.csv",
            &["PASS", "SKIP", "FAIL"],
        );
        let row = aggregate_file(&path).unwrap();
        assert_eq!((row.total, row.passed, row.failed), (3, 1, 2));
    }

    #[test]
    fn ignores_non_report_files_and_missing_dir() {
        let dir = tempdir().unwrap();
        write_report(dir.path(), "notes.csv", &["PASS"]);
        fs::write(dir.path().join("test_results_x.txt"), "status\nPASS\n").unwrap();
        fs::create_dir(dir.path().join("test_results_dir.csv")).unwrap();
        assert!(aggregate(dir.path(), MalformedPolicy::Abort)
            .unwrap()
            .is_empty());
        assert!(aggregate(&dir.path().join("absent"), MalformedPolicy::Abort)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_report_aborts_or_is_skipped() {
        let dir = tempdir().unwrap();
        write_report(dir.path(), "test_results_20250101T000000Z.csv", &["PASS"]);
        fs::write(
            dir.path().join("test_results_20250102T000000Z.csv"),
            "test_id,reading\n1,2\n",
        )
        .unwrap();

        let err = aggregate(dir.path(), MalformedPolicy::Abort).unwrap_err();
        assert!(format!("{err:#}").contains("test_results_20250102T000000Z.csv"));

        let rows = aggregate(dir.path(), MalformedPolicy::Skip).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ts, "20250101T000000Z");
    }

    #[test]
    fn listing_is_newest_first() {
        let dir = tempdir().unwrap();
        let older = write_report(dir.path(), "test_results_20240101T000000Z.csv", &[]);
        let newer = write_report(dir.path(), "test_results_20250101T000000Z.csv", &[]);
        assert_eq!(list_reports(dir.path()).unwrap(), vec![newer.clone(), older]);
        assert_eq!(latest_report(dir.path()).unwrap(), Some(newer));
        assert_eq!(latest_report(&dir.path().join("absent")).unwrap(), None);
    }

    #[test]
    fn summary_reports_rates_and_reading_stats() {
        let dir = tempdir().unwrap();
        let path = write_report(
            dir.path(),
            "test_results_20250101T000000Z.csv",
            &["PASS", "PASS", "PASS", "PASS", "FAIL"],
        );
        let summary = summarize_report(&path).unwrap();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.passed, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pass_rate, "80.0%");
        assert_eq!(
            summary.last_timestamp.as_deref(),
            Some("2025-01-01T00:00:04.000000Z")
        );
        assert_eq!(summary.reading_min, Some(20.5));
        assert_eq!(summary.reading_max, Some(24.5));
        assert_eq!(summary.reading_mean, Some(22.5));
    }

    #[test]
    fn summary_of_empty_report() {
        let dir = tempdir().unwrap();
        let path = write_report(dir.path(), "test_results_20250101T000000Z.csv", &[]);
        let summary = summarize_report(&path).unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.pass_rate, "0%");
        assert_eq!(summary.last_timestamp, None);
        assert_eq!(summary.reading_mean, None);
    }
}
