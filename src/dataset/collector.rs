//! Sample collection against a timed target.

use std::time::Instant;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::info;

use super::{DatasetMetadata, TimingDataset};
use crate::arith::random_below;
use crate::error::{LabError, Result};
use crate::target::TimedRsa;
use crate::types::TimingSample;

/// Drives a target with uniformly random inputs and records the timings.
///
/// Inputs are drawn from `[0, n)` by rejection sampling on a seeded stream,
/// so the same seed always reproduces the same dataset.
#[derive(Debug)]
pub struct Collector<T> {
    target: T,
    use_public: bool,
}

impl<T: TimedRsa> Collector<T> {
    /// Collect private-key operations (decryptions) from `target`.
    pub fn new(target: T) -> Self {
        Self {
            target,
            use_public: false,
        }
    }

    /// Time public-key operations instead.
    pub fn use_public(mut self, use_public: bool) -> Self {
        self.use_public = use_public;
        self
    }

    /// Borrow the target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Give the target back.
    pub fn into_target(self) -> T {
        self.target
    }

    /// Collect `num_samples` timings with inputs drawn from a stream seeded
    /// with `seed`.
    ///
    /// The target's noise stream is separate and advances one draw per
    /// sample.
    pub fn collect(&mut self, num_samples: usize, seed: u64) -> Result<TimingDataset> {
        if num_samples == 0 {
            return Err(LabError::domain("sample count must be positive"));
        }
        let start = Instant::now();
        let public = self.target.public_key().clone();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut samples = Vec::with_capacity(num_samples);

        for _ in 0..num_samples {
            let input = random_below(&mut rng, &public.n);
            let out = self.target.timed_operate(&input, self.use_public)?;
            samples.push(TimingSample::new(input, out.time_ns));
        }

        let collection_time_secs = start.elapsed().as_secs_f64();
        info!(
            samples = num_samples,
            target = self.target.name(),
            profile = %self.target.profile().name,
            seed,
            secs = collection_time_secs,
            "collected timing dataset"
        );

        Ok(TimingDataset::new(
            public,
            samples,
            DatasetMetadata {
                seed,
                target: self.target.name().to_string(),
                profile: self.target.profile().name.clone(),
                collection_time_secs,
            },
        ))
    }
}
