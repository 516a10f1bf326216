use chrono::{DateTime, Utc};

pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const REPORT_PREFIX: &str = "test_results_";
pub const REPORT_SUFFIX: &str = ".csv";

/// Fixed width, so file names sort chronologically as plain text.
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

pub fn report_file_name(at: DateTime<Utc>) -> String {
    format!(
        "{REPORT_PREFIX}{}{REPORT_SUFFIX}",
        at.format(FILE_TIMESTAMP_FORMAT)
    )
}

/// Same shape as the `test_results_*.csv` glob.
pub fn is_report_file_name(name: &str) -> bool {
    name.len() >= REPORT_PREFIX.len() + REPORT_SUFFIX.len()
        && name.starts_with(REPORT_PREFIX)
        && name.ends_with(REPORT_SUFFIX)
}

/// Display timestamp for a report: the file name minus prefix and suffix.
/// No date parsing happens here.
pub fn timestamp_from_file_name(name: &str) -> String {
    let trimmed = name.strip_prefix(REPORT_PREFIX).unwrap_or(name);
    trimmed
        .strip_suffix(REPORT_SUFFIX)
        .unwrap_or(trimmed)
        .to_string()
}
