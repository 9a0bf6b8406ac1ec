//! # rsa-timing-lab
//!
//! Simulated RSA timing side channels and statistical recovery of the
//! private exponent.
//!
//! The crate pairs a timed RSA target, whose Montgomery extra reductions
//! cost simulated time, with an attack engine that recovers the private
//! exponent bit by bit from (input, elapsed time) samples:
//! - Exact Montgomery ladders shared by target and attacker
//! - Seeded, fully reproducible noise and input streams
//! - Per-bit confidence for every recovered bit
//! - Campaign sweeps over profiles, key sizes and sample counts
//!
//! ## Reproducibility
//!
//! Nothing reads process-wide random state. Every target takes a noise seed,
//! every collection takes an input seed, and campaigns derive both from one
//! top-level seed, so the same configuration always yields the same datasets
//! and the same attack results.
//!
//! ## Quick Start
//!
//! ```ignore
//! use rsa_timing_lab::{generate_keypair, Collector, LeakageProfile, TimingAttack, VulnerableRsa, AttackConfig};
//!
//! let key = generate_keypair(64, 65537, 42)?;
//! let target = VulnerableRsa::new(key.clone(), LeakageProfile::preset("vuln_50us")?, 1)?;
//! let dataset = Collector::new(target).collect(160_000, 2)?;
//!
//! let result = rsa_timing_lab::attack(&dataset, key.exponent_bits() as usize)?.scored(key.d());
//! println!("recovered: {}", result.success);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod key;
mod result;
mod types;

pub mod campaign;
pub mod keygen;
pub mod thread_pool;

// Functional modules
pub mod arith;
pub mod attack;
pub mod dataset;
pub mod output;
pub mod statistics;
pub mod target;

// Re-exports for public API
pub use arith::ExponentiationShape;
pub use attack::{CancelToken, ExponentAttack, TimingAttack};
pub use campaign::{Campaign, CampaignReport, SweepPoint, TrialRecord};
pub use config::{AttackConfig, CampaignConfig, Distinguisher};
pub use dataset::{Collector, DatasetMetadata, DatasetSummary, TimingDataset};
pub use error::{LabError, Result};
pub use key::{KeyMaterial, PublicKey};
pub use keygen::generate_keypair;
pub use result::{AttackResult, BitHypothesis, BitOrigin};
pub use target::{ConstantTimeRsa, LeakageProfile, NoiseModel, TimedRsa, VulnerableRsa};
pub use types::{TimedOutput, TimingSample, NS_PER_US};

/// Attack a whole dataset with the default configuration.
///
/// `exponent_bits` is the bit length of the private exponent. The dataset
/// carries the public key it was collected against. The result is unscored;
/// pass the ground truth to [`AttackResult::score`] to set `success`.
pub fn attack(dataset: &TimingDataset, exponent_bits: usize) -> Result<AttackResult> {
    TimingAttack::from_data(
        dataset.samples(),
        dataset.public_key(),
        exponent_bits,
        AttackConfig::default(),
    )?
    .attack()
}
