use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;

use super::plan::RunPlan;
use crate::models::{ResultRecord, SpecWindow, TestStatus};
use crate::sensing::random::{fresh_source, seeded_source};
use crate::sensing::{RandomSource, VirtualSensor};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Records of a finished run, in generation order.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub records: Vec<ResultRecord>,
}

impl RunOutcome {
    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.passed()
    }
}

/// PASS only for a present reading inside the inclusive window.
pub fn classify(reading: Option<f64>, window: &SpecWindow) -> TestStatus {
    match reading {
        Some(value) if window.contains(value) => TestStatus::Pass,
        _ => TestStatus::Fail,
    }
}

/// Poll the sensor `plan.iterations` times and classify every reading.
///
/// A dropped reading is recorded as FAIL and the run moves on; nothing is
/// re-polled.
pub fn run_tests<R: RandomSource>(plan: &RunPlan, rng: R) -> Result<RunOutcome> {
    plan.validate()?;
    let mut sensor = VirtualSensor::with_rng(plan.sensor, rng)?;

    log_info!(
        "starting run: {} iterations, spec [{}, {}], sensor [{}, {}] fail_rate {}",
        plan.iterations,
        plan.window.min,
        plan.window.max,
        plan.sensor.min_temp,
        plan.sensor.max_temp,
        plan.sensor.fail_rate
    );

    let mut records = Vec::with_capacity(plan.iterations);
    for test_id in 1..=plan.iterations as u64 {
        let reading = sensor.read_temperature();
        if reading.is_none() {
            log_debug!("test {test_id}: transient sensor failure");
        }
        records.push(ResultRecord {
            test_id,
            reading,
            status: classify(reading, &plan.window),
            timestamp_utc: Utc::now(),
        });
    }

    let outcome = RunOutcome { records };
    log_info!(
        "run finished: {} passed, {} failed",
        outcome.passed(),
        outcome.failed()
    );
    Ok(outcome)
}

/// `run_tests` with a seeded source, or a fresh one when no seed is given.
pub fn run_tests_seeded(plan: &RunPlan, seed: Option<u64>) -> Result<RunOutcome> {
    let rng: StdRng = match seed {
        Some(seed) => seeded_source(seed),
        None => fresh_source(),
    };
    run_tests(plan, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::SensorConfig;
    use chrono::DateTime;

    fn plan(iterations: usize, sensor: SensorConfig, window: SpecWindow) -> RunPlan {
        RunPlan {
            iterations,
            window,
            sensor,
        }
    }

    fn pairs(outcome: &RunOutcome) -> Vec<(Option<u64>, TestStatus)> {
        outcome
            .records
            .iter()
            .map(|r| (r.reading.map(f64::to_bits), r.status))
            .collect()
    }

    #[test]
    fn classify_covers_absent_inside_and_outside() {
        let window = SpecWindow { min: 10.0, max: 20.0 };
        assert_eq!(classify(None, &window), TestStatus::Fail);
        assert_eq!(classify(Some(10.0), &window), TestStatus::Pass);
        assert_eq!(classify(Some(20.0), &window), TestStatus::Pass);
        assert_eq!(classify(Some(20.01), &window), TestStatus::Fail);
        assert_eq!(classify(Some(9.99), &window), TestStatus::Fail);
    }

    #[test]
    fn seed_zero_in_window_run_all_pass() {
        let plan = plan(
            20,
            SensorConfig::new(10.0, 20.0, 0.0).unwrap(),
            SpecWindow::new(10.0, 20.0).unwrap(),
        );
        let outcome = run_tests_seeded(&plan, Some(0)).unwrap();
        assert_eq!(outcome.records.len(), 20);
        for record in &outcome.records {
            assert_eq!(record.status, TestStatus::Pass);
            let reading = record.reading.unwrap();
            assert!((10.0..=20.0).contains(&reading));
        }
        assert_eq!(outcome.passed(), 20);
        assert_eq!(outcome.failed(), 0);
    }

    #[test]
    fn full_fail_rate_run_all_fail_without_readings() {
        let plan = plan(
            10,
            SensorConfig::new(20.0, 30.0, 1.0).unwrap(),
            SpecWindow::new(20.0, 30.0).unwrap(),
        );
        let outcome = run_tests_seeded(&plan, Some(1)).unwrap();
        assert_eq!(outcome.records.len(), 10);
        assert!(outcome
            .records
            .iter()
            .all(|r| r.reading.is_none() && r.status == TestStatus::Fail));
    }

    #[test]
    fn ids_are_sequential_and_timestamps_end_in_z() {
        let plan = plan(5, SensorConfig::default(), SpecWindow { min: 20.0, max: 30.0 });
        let outcome = run_tests_seeded(&plan, None).unwrap();
        assert_eq!(outcome.records.len(), 5);
        for (idx, record) in outcome.records.iter().enumerate() {
            assert_eq!(record.test_id, idx as u64 + 1);
            let ts = record.timestamp_iso();
            assert!(ts.ends_with('Z'));
            DateTime::parse_from_rfc3339(&ts).unwrap();
        }
        assert!(outcome
            .records
            .windows(2)
            .all(|w| w[0].timestamp_utc <= w[1].timestamp_utc));
    }

    #[test]
    fn identical_seeds_reproduce_readings_and_statuses() {
        let plan = plan(50, SensorConfig::default(), SpecWindow { min: 22.0, max: 28.0 });
        let first = run_tests_seeded(&plan, Some(1234)).unwrap();
        let second = run_tests_seeded(&plan, Some(1234)).unwrap();
        assert_eq!(pairs(&first), pairs(&second));
    }

    #[test]
    fn narrow_window_produces_out_of_range_failures() {
        let plan = plan(
            100,
            SensorConfig::new(0.0, 100.0, 0.0).unwrap(),
            SpecWindow::new(45.0, 55.0).unwrap(),
        );
        let outcome = run_tests_seeded(&plan, Some(5)).unwrap();
        assert!(outcome.failed() > 0);
        for record in &outcome.records {
            let reading = record.reading.unwrap();
            assert_eq!(record.is_pass(), (45.0..=55.0).contains(&reading));
        }
    }

    #[test]
    fn invalid_plan_fails_before_polling() {
        let bad = plan(0, SensorConfig::default(), SpecWindow { min: 20.0, max: 30.0 });
        assert!(run_tests_seeded(&bad, Some(0)).is_err());
        let inverted = plan(3, SensorConfig::default(), SpecWindow { min: 30.0, max: 20.0 });
        assert!(run_tests_seeded(&inverted, Some(0)).is_err());
    }
}
