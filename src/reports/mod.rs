//! Report files: naming, writing, reading and aggregation.
//!
//! A report is `reports/test_results_<YYYYMMDDTHHMMSSZ>.csv` holding the
//! records of exactly one run. Reports are written once and never appended to.

pub mod aggregate;
pub mod naming;
pub mod reader;
pub mod writer;

pub use aggregate::{
    aggregate, aggregate_file, latest_report, list_reports, summarize_report, MalformedPolicy,
};
pub use naming::{report_file_name, timestamp_from_file_name, DEFAULT_REPORTS_DIR};
pub use reader::{read_report, ReportTable};
pub use writer::{ensure_reports_dir, save_results, save_results_at};
