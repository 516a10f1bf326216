use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::SpecWindow;
use crate::sensing::SensorConfig;

/// Everything a run needs apart from its random source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    pub iterations: usize,
    pub window: SpecWindow,
    pub sensor: SensorConfig,
}

impl RunPlan {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            bail!("iteration count must be at least 1");
        }
        self.window.validate().context("invalid spec window")?;
        self.sensor.validate().context("invalid sensor configuration")?;
        Ok(())
    }
}
