use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::random::{fresh_source, RandomSource};
use crate::models::iso_utc;

pub const DEVICE_ID: &str = "VDS-001";
pub const DEVICE_MODEL: &str = "virtual-sensor-1";

/// Largest bound magnitude at which an `f64` reading still resolves to 0.01.
/// Also keeps the sampled range width finite.
pub const MAX_TEMP_MAGNITUDE: f64 = 1e13;

/// Distribution the virtual sensor draws from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub min_temp: f64,
    pub max_temp: f64,
    /// Probability in `[0, 1]` that a poll yields no reading.
    pub fail_rate: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            min_temp: 20.0,
            max_temp: 30.0,
            fail_rate: 0.05,
        }
    }
}

impl SensorConfig {
    pub fn new(min_temp: f64, max_temp: f64, fail_rate: f64) -> Result<Self> {
        let config = Self {
            min_temp,
            max_temp,
            fail_rate,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_temp.is_finite() || !self.max_temp.is_finite() {
            bail!(
                "sensor range must be finite (got {}..{})",
                self.min_temp,
                self.max_temp
            );
        }
        if self.min_temp > self.max_temp {
            bail!(
                "sensor min_temp {} exceeds max_temp {}",
                self.min_temp,
                self.max_temp
            );
        }
        if self.min_temp.abs() > MAX_TEMP_MAGNITUDE || self.max_temp.abs() > MAX_TEMP_MAGNITUDE {
            bail!(
                "sensor range {}..{} exceeds +/-{MAX_TEMP_MAGNITUDE:e}",
                self.min_temp,
                self.max_temp
            );
        }
        if !(0.0..=1.0).contains(&self.fail_rate) {
            bail!("sensor fail_rate {} outside [0, 1]", self.fail_rate);
        }
        Ok(())
    }
}

/// Static provenance for reports and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub device_id: String,
    pub model: String,
    pub timestamp: String,
}

/// Temperature sensor that never touches hardware.
///
/// Each poll consumes one unit draw to decide whether the read fails and, on
/// success, one more draw for the value itself.
pub struct VirtualSensor<R: RandomSource = StdRng> {
    config: SensorConfig,
    rng: R,
}

impl VirtualSensor<StdRng> {
    pub fn new(config: SensorConfig) -> Result<Self> {
        Self::with_rng(config, fresh_source())
    }
}

impl<R: RandomSource> VirtualSensor<R> {
    pub fn with_rng(config: SensorConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// `None` models a transient read fault.
    pub fn read_temperature(&mut self) -> Option<f64> {
        if self.rng.next_unit() < self.config.fail_rate {
            return None;
        }
        let raw = self.rng.uniform(self.config.min_temp, self.config.max_temp);
        Some(round_centi(raw))
    }

    pub fn metadata(&self) -> DeviceMetadata {
        device_metadata(Utc::now())
    }
}

pub fn device_metadata(at: DateTime<Utc>) -> DeviceMetadata {
    DeviceMetadata {
        device_id: DEVICE_ID.to_string(),
        model: DEVICE_MODEL.to_string(),
        timestamp: iso_utc(at),
    }
}

fn round_centi(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
