//! Synthetic training data for the burst-time predictor

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::forest::TrainingSample;

/// Smallest label a synthetic sample can carry
pub const MIN_SYNTHETIC_BURST: f64 = 1.0;
/// Largest label a synthetic sample can carry
pub const MAX_SYNTHETIC_BURST: f64 = 20.0;

/// Draws samples whose burst time grows with priority, memory and I/O load.
///
/// Features are integers drawn uniformly from `arrival ∈ [0, 10)`,
/// `priority ∈ [1, 10]`, `memory ∈ [10, 110)` and `io_ops ∈ [0, 5)`. The label
/// is `floor(0.5·priority + 0.05·memory + 0.8·io + noise)` with
/// `noise ∈ [0, 3)`, clamped to `[1, 20]`.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    arrival: Uniform<u32>,
    priority: Uniform<u32>,
    memory: Uniform<u32>,
    io: Uniform<u32>,
    noise: Uniform<f64>,
}

impl SyntheticGenerator {
    /// Create the generator
    #[must_use]
    pub fn new() -> Self {
        Self {
            arrival: Uniform::new(0, 10),
            priority: Uniform::new_inclusive(1, 10),
            memory: Uniform::new(10, 110),
            io: Uniform::new(0, 5),
            noise: Uniform::new(0.0, 3.0),
        }
    }

    /// Draw one sample
    pub fn sample<R>(&self, rng: &mut R) -> TrainingSample
    where
        R: Rng + ?Sized,
    {
        let arrival = f64::from(self.arrival.sample(rng));
        let priority = f64::from(self.priority.sample(rng));
        let memory = f64::from(self.memory.sample(rng));
        let io = f64::from(self.io.sample(rng));
        let noise = self.noise.sample(rng);

        let burst = (priority * 0.5 + memory * 0.05 + io * 0.8 + noise).floor();
        TrainingSample::new(
            [arrival, priority, memory, io],
            burst.clamp(MIN_SYNTHETIC_BURST, MAX_SYNTHETIC_BURST),
        )
    }

    /// Draw `count` samples
    pub fn samples<R>(&self, count: usize, rng: &mut R) -> Vec<TrainingSample>
    where
        R: Rng + ?Sized,
    {
        (0..count).map(|_| self.sample(rng)).collect()
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}
