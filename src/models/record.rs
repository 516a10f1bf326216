//! Per-iteration result data produced by the test runner.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::iso_utc;

/// Inclusive acceptance range a reading must fall in to pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecWindow {
    pub min: f64,
    pub max: f64,
}

impl SpecWindow {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let window = Self { min, max };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            bail!("spec window must be finite (got {}..{})", self.min, self.max);
        }
        if self.min > self.max {
            bail!("spec min {} exceeds spec max {}", self.min, self.max);
        }
        Ok(())
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
        }
    }
}

/// One sensor poll and its verdict. Never mutated after the runner builds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub test_id: u64,
    pub reading: Option<f64>,
    pub status: TestStatus,
    pub timestamp_utc: DateTime<Utc>,
}

impl ResultRecord {
    pub fn is_pass(&self) -> bool {
        self.status == TestStatus::Pass
    }

    pub fn timestamp_iso(&self) -> String {
        iso_utc(self.timestamp_utc)
    }
}
