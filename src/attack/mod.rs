//! Timing attack engine.
//!
//! The attack sees only the public key, the exponent length and the
//! dataset. It recovers the private exponent one bit at a time, most
//! significant first, replaying every sample's ladder under the bits fixed
//! so far.
//!
//! - [`TimingAttack`]: the greedy bit-by-bit attack
//! - [`CancelToken`]: cooperative early exit
//! - [`registry`]: attack constructors by name

mod cancel;
mod distinguisher;
mod engine;
mod predict;

pub use cancel::CancelToken;
pub use engine::TimingAttack;

use crate::config::AttackConfig;
use crate::error::{LabError, Result};
use crate::key::PublicKey;
use crate::result::AttackResult;
use crate::types::TimingSample;

/// An attack that recovers a private exponent from timing samples.
pub trait ExponentAttack {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Run until done or until `cancel` is set.
    fn attack_with_cancel(&self, cancel: &CancelToken) -> Result<AttackResult>;

    /// Run to completion.
    fn attack(&self) -> Result<AttackResult> {
        self.attack_with_cancel(&CancelToken::new())
    }
}

/// Constructor signature stored in the registry: samples, public key,
/// exponent length and configuration.
pub type AttackConstructor = for<'a> fn(
    &'a [TimingSample],
    &PublicKey,
    usize,
    AttackConfig,
) -> Result<Box<dyn ExponentAttack + 'a>>;

/// One registry entry.
#[derive(Clone, Copy)]
pub struct AttackEntry {
    /// Name used in campaign configurations.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Builds the attack.
    pub construct: AttackConstructor,
}

impl std::fmt::Debug for AttackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttackEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

fn build_dhem<'a>(
    samples: &'a [TimingSample],
    public: &PublicKey,
    exponent_bits: usize,
    config: AttackConfig,
) -> Result<Box<dyn ExponentAttack + 'a>> {
    Ok(Box::new(TimingAttack::from_data(
        samples,
        public,
        exponent_bits,
        config,
    )?))
}

const ATTACKS: &[AttackEntry] = &[AttackEntry {
    name: "dhem",
    description: "greedy bit-by-bit extra-reduction distinguisher",
    construct: build_dhem,
}];

/// All registered attacks.
pub fn registry() -> &'static [AttackEntry] {
    ATTACKS
}

/// Build the attack registered under `name`.
pub fn build_attack<'a>(
    name: &str,
    samples: &'a [TimingSample],
    public: &PublicKey,
    exponent_bits: usize,
    config: AttackConfig,
) -> Result<Box<dyn ExponentAttack + 'a>> {
    let entry = ATTACKS
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| LabError::UnknownConfiguration {
            kind: "attack",
            name: name.to_string(),
        })?;
    (entry.construct)(samples, public, exponent_bits, config)
}
