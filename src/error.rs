//! Error taxonomy for the laboratory.
//!
//! Every error is local to one operation (one target call, one attack run,
//! one campaign trial). The campaign driver records failures and moves on.

use thiserror::Error;

/// Errors produced by targets, the attack engine and the campaign driver.
#[derive(Debug, Error)]
pub enum LabError {
    /// Malformed or out-of-range key, input or configuration parameter.
    #[error("domain error: {reason}")]
    Domain {
        /// What was out of range.
        reason: String,
    },

    /// The dataset is smaller than the attack requires.
    #[error("insufficient data: {available} samples available, {required} required")]
    InsufficientData {
        /// Samples available to the attack.
        available: usize,
        /// Minimum configured sample count.
        required: usize,
    },

    /// Public parameters cannot satisfy the exponent relation the attack assumes.
    #[error("inconsistent key: {reason}")]
    InconsistentKey {
        /// Which relation failed.
        reason: String,
    },

    /// Toy key generation ran out of attempts.
    #[error("unable to generate a {bits}-bit key pair after {attempts} attempts")]
    KeyGeneration {
        /// Requested modulus size.
        bits: u64,
        /// Attempts made.
        attempts: usize,
    },

    /// A registry lookup found nothing under the given name.
    #[error("unknown {kind} configuration `{name}`")]
    UnknownConfiguration {
        /// Registry kind ("target", "profile", "attack").
        kind: &'static str,
        /// Name that was requested.
        name: String,
    },

    /// JSON export failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LabError {
    pub(crate) fn domain(reason: impl Into<String>) -> Self {
        LabError::Domain {
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent_key(reason: impl Into<String>) -> Self {
        LabError::InconsistentKey {
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, LabError>;
