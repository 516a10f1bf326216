//! Summaries derived from report files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One row of the aggregate table. `failed` is always `total - passed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub file: PathBuf,
    pub ts: String,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
}

/// KPIs for a single report, as shown by `vdats show`.
///
/// Unlike [`AggregateRow`], `failed` counts rows whose status is literally
/// `FAIL`, so `passed + failed` can be less than `total` for foreign rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub file: PathBuf,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub pass_rate: String,
    pub last_timestamp: Option<String>,
    pub reading_min: Option<f64>,
    pub reading_max: Option<f64>,
    pub reading_mean: Option<f64>,
}
