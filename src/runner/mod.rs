pub mod executor;
pub mod plan;

pub use executor::{classify, run_tests, run_tests_seeded, RunOutcome};
pub use plan::RunPlan;
