use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform randomness consumed by the virtual sensor.
///
/// Every `rand::Rng` is a `RandomSource`, so a seeded `StdRng` gives
/// reproducible runs and `fresh_source()` gives an independent one.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform value in `[low, high]`. Callers guarantee `low <= high`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl<R: Rng> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.gen_range(low..=high)
    }
}

/// Entropy-seeded source, one per sensor that was not handed its own.
pub fn fresh_source() -> StdRng {
    StdRng::from_entropy()
}

pub fn seeded_source(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
