use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::models::SpecWindow;
use crate::reports::DEFAULT_REPORTS_DIR;
use crate::runner::RunPlan;
use crate::sensing::SensorConfig;

/// Knobs for a test run, loadable from a JSON file. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub iterations: usize,
    pub spec_min: f64,
    pub spec_max: f64,
    pub sensor: SensorConfig,
    pub seed: Option<u64>,
    pub reports_dir: PathBuf,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            iterations: 100,
            spec_min: 20.0,
            spec_max: 30.0,
            sensor: SensorConfig::default(),
            seed: None,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
        }
    }
}

impl RunSettings {
    /// Validated plan for the executor.
    pub fn plan(&self) -> Result<RunPlan> {
        let plan = RunPlan {
            iterations: self.iterations,
            window: SpecWindow {
                min: self.spec_min,
                max: self.spec_max,
            },
            sensor: self.sensor,
        };
        plan.validate()?;
        Ok(plan)
    }
}

pub struct SettingsStore;

impl SettingsStore {
    /// Read settings from `path`; a file that does not exist means defaults.
    pub fn load(path: &Path) -> Result<RunSettings> {
        if !path.exists() {
            return Ok(RunSettings::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    pub fn save(path: &Path, settings: &RunSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(settings)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
