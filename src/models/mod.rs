pub mod record;
pub mod report;

pub use record::{ResultRecord, SpecWindow, TestStatus};
pub use report::{AggregateRow, ReportSummary};

use chrono::{DateTime, SecondsFormat, Utc};

/// ISO-8601 UTC instant with a literal `Z` instead of `+00:00`.
pub fn iso_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
