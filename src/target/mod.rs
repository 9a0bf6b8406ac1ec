//! Simulated timed RSA targets.
//!
//! A target owns its key material and a seeded noise stream. The only thing
//! it reveals per call is the output and the simulated elapsed time.
//!
//! - [`VulnerableRsa`]: extra reductions cost `extra_reduction_ns` each
//! - [`ConstantTimeRsa`]: every product pays, so time carries no data
//! - [`registry`]: target constructors by name

mod constant_time;
mod noise;
mod profile;
mod unit;
mod vulnerable;

pub use constant_time::ConstantTimeRsa;
pub use noise::NoiseSource;
pub use profile::{LeakageProfile, NoiseModel, DEFAULT_BASE_COST_NS, DEFAULT_NOISE_SIGMA_NS};
pub use vulnerable::VulnerableRsa;

use num_bigint::BigUint;

use crate::arith::ExponentiationShape;
use crate::error::{LabError, Result};
use crate::key::{KeyMaterial, PublicKey};
use crate::types::TimedOutput;

/// A black-box RSA implementation that reports how long each call took.
pub trait TimedRsa: Send {
    /// Registry name of the implementation.
    fn name(&self) -> &'static str;

    /// Public half of the key.
    fn public_key(&self) -> &PublicKey;

    /// Leakage profile the target was built with.
    fn profile(&self) -> &LeakageProfile;

    /// Ladder shape used for every exponentiation.
    fn shape(&self) -> ExponentiationShape;

    /// Compute `input^e mod n` (`use_public`) or `input^d mod n` and report
    /// the simulated time. Advances the noise stream by one draw.
    ///
    /// Fails with `Domain` if `input >= n`.
    fn timed_operate(&mut self, input: &BigUint, use_public: bool) -> Result<TimedOutput>;

    /// Timed public-key operation.
    fn timed_encrypt(&mut self, message: &BigUint) -> Result<TimedOutput> {
        self.timed_operate(message, true)
    }

    /// Timed private-key operation.
    fn timed_decrypt(&mut self, ciphertext: &BigUint) -> Result<TimedOutput> {
        self.timed_operate(ciphertext, false)
    }

    /// Timed signature; same operation as decryption.
    fn timed_sign(&mut self, message: &BigUint) -> Result<TimedOutput> {
        self.timed_operate(message, false)
    }

    /// Apply the public exponent to `signature` and compare with `message`.
    /// Returns the verdict and the elapsed time.
    fn timed_verify(&mut self, signature: &BigUint, message: &BigUint) -> Result<(bool, f64)> {
        let out = self.timed_operate(signature, true)?;
        Ok((&out.output == message, out.time_ns))
    }
}

impl<T: TimedRsa + ?Sized> TimedRsa for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn public_key(&self) -> &PublicKey {
        (**self).public_key()
    }

    fn profile(&self) -> &LeakageProfile {
        (**self).profile()
    }

    fn shape(&self) -> ExponentiationShape {
        (**self).shape()
    }

    fn timed_operate(&mut self, input: &BigUint, use_public: bool) -> Result<TimedOutput> {
        (**self).timed_operate(input, use_public)
    }
}

/// Constructor signature stored in the registry.
pub type TargetConstructor =
    fn(KeyMaterial, LeakageProfile, ExponentiationShape, u64) -> Result<Box<dyn TimedRsa>>;

/// One registry entry.
#[derive(Debug, Clone, Copy)]
pub struct TargetEntry {
    /// Name used in campaign configurations.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Builds the target from key, profile, shape and noise seed.
    pub construct: TargetConstructor,
}

fn build_vulnerable(
    key: KeyMaterial,
    profile: LeakageProfile,
    shape: ExponentiationShape,
    seed: u64,
) -> Result<Box<dyn TimedRsa>> {
    Ok(Box::new(VulnerableRsa::with_shape(key, profile, shape, seed)?))
}

fn build_constant_time(
    key: KeyMaterial,
    profile: LeakageProfile,
    shape: ExponentiationShape,
    seed: u64,
) -> Result<Box<dyn TimedRsa>> {
    Ok(Box::new(ConstantTimeRsa::with_shape(key, profile, shape, seed)?))
}

const TARGETS: &[TargetEntry] = &[
    TargetEntry {
        name: "vulnerable",
        description: "conditional extra reduction costs time",
        construct: build_vulnerable,
    },
    TargetEntry {
        name: "constant_time",
        description: "every product pays the reduction cost",
        construct: build_constant_time,
    },
];

/// All registered targets.
pub fn registry() -> &'static [TargetEntry] {
    TARGETS
}

/// Build the target registered under `name`.
pub fn build_target(
    name: &str,
    key: KeyMaterial,
    profile: LeakageProfile,
    shape: ExponentiationShape,
    seed: u64,
) -> Result<Box<dyn TimedRsa>> {
    let entry = TARGETS
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| LabError::UnknownConfiguration {
            kind: "target",
            name: name.to_string(),
        })?;
    (entry.construct)(key, profile, shape, seed)
}
