//! Seeded measurement noise.

use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::profile::NoiseModel;
use crate::error::{LabError, Result};

#[derive(Debug, Clone)]
enum Sampler {
    Zero,
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
}

/// Noise stream seeded once at target construction.
///
/// The same seed always produces the same sequence of draws, one per
/// [`NoiseSource::sample`] call.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    sampler: Sampler,
    rng: Xoshiro256PlusPlus,
}

impl NoiseSource {
    /// Create a stream for `model` seeded with `seed`.
    pub fn new(model: &NoiseModel, seed: u64) -> Result<Self> {
        model.validate()?;
        let sampler = match *model {
            NoiseModel::None => Sampler::Zero,
            NoiseModel::Gaussian { sigma_ns } if sigma_ns == 0.0 => Sampler::Zero,
            NoiseModel::Gaussian { sigma_ns } => Sampler::Normal(
                Normal::new(0.0, sigma_ns)
                    .map_err(|e| LabError::domain(format!("gaussian noise: {}", e)))?,
            ),
            NoiseModel::Uniform { low_ns, high_ns } => Sampler::Uniform(
                Uniform::new_inclusive(low_ns, high_ns)
                    .map_err(|e| LabError::domain(format!("uniform noise: {}", e)))?,
            ),
        };
        Ok(Self {
            sampler,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        })
    }

    /// Draw the next noise value in nanoseconds.
    pub fn sample(&mut self) -> f64 {
        match &self.sampler {
            Sampler::Zero => 0.0,
            Sampler::Normal(d) => d.sample(&mut self.rng),
            Sampler::Uniform(d) => d.sample(&mut self.rng),
        }
    }
}
