pub mod cli;
pub mod models;
pub mod reports;
pub mod runner;
pub mod sensing;
pub mod settings;
mod utils;

pub use models::{AggregateRow, ReportSummary, ResultRecord, SpecWindow, TestStatus};
pub use reports::{aggregate, save_results, MalformedPolicy};
pub use runner::{classify, run_tests, run_tests_seeded, RunOutcome, RunPlan};
pub use sensing::{RandomSource, SensorConfig, VirtualSensor};

pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("vdats starting up...");

    cli::run_from_env()
}
