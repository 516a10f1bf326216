use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use super::naming::report_file_name;
use crate::models::ResultRecord;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const REPORT_HEADER: &str = "test_id,reading,status,timestamp_utc";

/// Create the reports directory. Callers do this once before saving.
pub fn ensure_reports_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create reports directory {}", dir.display()))
}

/// Render records as report text: header row, then one row per record.
pub fn encode_report(records: &[ResultRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(REPORT_HEADER.to_string());

    for record in records {
        // `{:?}` keeps the trailing `.0` on whole numbers
        let reading = record
            .reading
            .map(|value| format!("{value:?}"))
            .unwrap_or_default();
        lines.push(format!(
            "{},{},{},{}",
            record.test_id,
            reading,
            record.status.as_str(),
            record.timestamp_iso()
        ));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Save a run under a file name stamped with the current UTC second.
pub fn save_results(dir: &Path, records: &[ResultRecord]) -> Result<PathBuf> {
    save_results_at(dir, records, Utc::now())
}

/// Save a run stamped with `at`. An existing report is never overwritten.
pub fn save_results_at(
    dir: &Path,
    records: &[ResultRecord],
    at: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = dir.join(report_file_name(at));
    let text = encode_report(records);
    create_report(&path, |file| file.write_all(text.as_bytes()))?;

    log_info!("saved {} records to {}", records.len(), path.display());
    Ok(path)
}

/// Create `path` exclusively and fill it with `write`. A failed write removes
/// the partial file so the name stays free and no truncated report remains.
fn create_report<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;

    if let Err(err) = write(&mut file) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            log_warn!(
                "could not remove partial report {}: {remove_err}",
                path.display()
            );
        }
        return Err(err).with_context(|| format!("Failed to write report {}", path.display()));
    }
    Ok(())
}
