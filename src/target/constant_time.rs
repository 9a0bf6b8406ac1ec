//! "Always subtract" target used as a negative control.

use num_bigint::BigUint;

use super::noise::NoiseSource;
use super::profile::LeakageProfile;
use super::unit::ExponentiationUnit;
use super::TimedRsa;
use crate::arith::ExponentiationShape;
use crate::error::Result;
use crate::key::{KeyMaterial, PublicKey};
use crate::types::TimedOutput;

/// RSA where every Montgomery product pays the reduction cost.
///
/// For a fixed key the elapsed time depends only on the exponent and the
/// noise draw, never on the input.
#[derive(Debug, Clone)]
pub struct ConstantTimeRsa {
    key: KeyMaterial,
    profile: LeakageProfile,
    unit: ExponentiationUnit,
    noise: NoiseSource,
}

impl ConstantTimeRsa {
    /// Build a target with the default square-and-multiply ladder.
    pub fn new(key: KeyMaterial, profile: LeakageProfile, seed: u64) -> Result<Self> {
        Self::with_shape(key, profile, ExponentiationShape::default(), seed)
    }

    /// Build a target with an explicit ladder shape.
    pub fn with_shape(
        key: KeyMaterial,
        profile: LeakageProfile,
        shape: ExponentiationShape,
        seed: u64,
    ) -> Result<Self> {
        profile.validate()?;
        Ok(Self {
            unit: ExponentiationUnit::new(&key, shape)?,
            noise: NoiseSource::new(&profile.noise, seed)?,
            key,
            profile,
        })
    }
}

impl TimedRsa for ConstantTimeRsa {
    fn name(&self) -> &'static str {
        "constant_time"
    }

    fn public_key(&self) -> &PublicKey {
        self.key.public()
    }

    fn profile(&self) -> &LeakageProfile {
        &self.profile
    }

    fn shape(&self) -> ExponentiationShape {
        self.unit.shape()
    }

    fn timed_operate(&mut self, input: &BigUint, use_public: bool) -> Result<TimedOutput> {
        let (trace, len) = self.unit.run(input, use_public)?;
        let time_ns = self.profile.base_cost_ns * len as f64
            + self.profile.effective_extra_ns() * f64::from(trace.operations)
            + self.noise.sample();
        Ok(TimedOutput::new(trace.result, time_ns))
    }
}
