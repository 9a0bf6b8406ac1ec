//! Target whose extra reductions cost time.

use num_bigint::BigUint;
use tracing::debug;

use super::noise::NoiseSource;
use super::profile::LeakageProfile;
use super::unit::ExponentiationUnit;
use super::TimedRsa;
use crate::arith::ExponentiationShape;
use crate::error::Result;
use crate::key::{KeyMaterial, PublicKey};
use crate::types::TimedOutput;

/// RSA with a data-dependent final subtraction in every Montgomery product.
///
/// Simulated time is
/// `base_cost_ns * L + extra_reduction_ns * events + noise`, clamped at zero,
/// where `events` counts extra reductions inside the exponentiation ladder.
/// Conversions into and out of Montgomery form are not charged.
#[derive(Debug, Clone)]
pub struct VulnerableRsa {
    key: KeyMaterial,
    profile: LeakageProfile,
    unit: ExponentiationUnit,
    noise: NoiseSource,
}

impl VulnerableRsa {
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
        let unit = ExponentiationUnit::new(&key, shape)?;
        let noise = NoiseSource::new(&profile.noise, seed)?;
        debug!(
            profile = %profile.name,
            shape = shape.name(),
            modulus_bits = key.public().modulus_bits(),
            "vulnerable target ready"
        );
        Ok(Self {
            key,
            profile,
            unit,
            noise,
        })
    }

    /// Ground-truth key material.
    pub fn key_material(&self) -> &KeyMaterial {
        &self.key
    }
}

impl TimedRsa for VulnerableRsa {
    fn name(&self) -> &'static str {
        "vulnerable"
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
            + self.profile.effective_extra_ns() * f64::from(trace.total_events())
            + self.noise.sample();
        Ok(TimedOutput::new(trace.result, time_ns))
    }
}
