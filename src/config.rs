//! Configuration for attacks and campaigns.

use std::env;

use serde::{Deserialize, Serialize};

use crate::arith::ExponentiationShape;
use crate::error::{LabError, Result};
use crate::keygen::DEFAULT_PUBLIC_EXPONENT;

/// Per-bit statistic used to choose between the two guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Distinguisher {
    /// Residual variance of elapsed time after regressing it on the
    /// predicted extra-reduction count. Smaller wins.
    #[default]
    ResidualVariance,
    /// Absolute difference of mean elapsed time between samples whose next
    /// predicted step reduces and those whose step does not. Larger wins.
    MeanDifference,
}

impl Distinguisher {
    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Distinguisher::ResidualVariance => "residual_variance",
            Distinguisher::MeanDifference => "mean_difference",
        }
    }

    /// Whether the larger statistic selects the guess.
    pub fn larger_wins(&self) -> bool {
        matches!(self, Distinguisher::MeanDifference)
    }
}

/// Configuration options for one attack run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackConfig {
    /// Minimum samples the attack accepts (default: 100).
    pub min_samples: usize,

    /// Attack only this many leading samples when set.
    pub max_samples: Option<usize>,

    /// Per-bit statistic (default: residual variance).
    pub distinguisher: Distinguisher,

    /// Ladder shape the target is assumed to use.
    pub shape: ExponentiationShape,

    /// Probe messages used to verify the recovered exponent (default: 8).
    pub verification_probes: usize,

    /// Bits below this confidence are reported as low confidence (default: 0.01).
    pub low_confidence_threshold: f64,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            min_samples: 100,
            max_samples: None,
            distinguisher: Distinguisher::default(),
            shape: ExponentiationShape::default(),
            verification_probes: 8,
            low_confidence_threshold: 0.01,
        }
    }
}

impl AttackConfig {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Small smoke-test configuration.
    ///
    /// Settings:
    /// - 10 minimum samples
    /// - at most 5,000 samples
    /// - 2 verification probes
    pub fn quick() -> Self {
        Self {
            min_samples: 10,
            max_samples: Some(5_000),
            verification_probes: 2,
            ..Self::default()
        }
    }

    /// Demanding configuration for large sweeps.
    ///
    /// Settings:
    /// - 1,000 minimum samples
    /// - 32 verification probes
    pub fn thorough() -> Self {
        Self {
            min_samples: 1_000,
            verification_probes: 32,
            ..Self::default()
        }
    }

    /// Set the minimum sample count.
    pub fn min_samples(mut self, n: usize) -> Self {
        self.min_samples = n;
        self
    }

    /// Limit the attack to a prefix of the dataset.
    pub fn max_samples(mut self, n: usize) -> Self {
        self.max_samples = Some(n);
        self
    }

    /// Select the per-bit statistic.
    pub fn distinguisher(mut self, distinguisher: Distinguisher) -> Self {
        self.distinguisher = distinguisher;
        self
    }

    /// Select the assumed ladder shape.
    pub fn shape(mut self, shape: ExponentiationShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the number of verification probes.
    pub fn verification_probes(mut self, n: usize) -> Self {
        self.verification_probes = n;
        self
    }

    /// Set the low-confidence reporting threshold.
    pub fn low_confidence_threshold(mut self, threshold: f64) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }
}

/// Configuration for a full campaign: every profile times every key size
/// times `keys_per_size` keys, each attacked at every sample count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Target registry name (default: `vulnerable`).
    pub target: String,

    /// Attack registry name (default: `dhem`).
    pub attack: String,

    /// Leakage profile preset names.
    pub profiles: Vec<String>,

    /// Modulus sizes in bits (default: 64 and 128).
    pub key_sizes: Vec<u64>,

    /// Keys generated per size and profile (default: 10).
    pub keys_per_size: usize,

    /// Prefix sizes attacked per key (default: 10k to 160k, doubling).
    pub sample_counts: Vec<usize>,

    /// Samples collected per key (default: 160,000).
    pub max_samples: usize,

    /// Top-level seed (default: 42).
    pub seed: u64,

    /// Public exponent for generated keys (default: 65537).
    pub public_exponent: u64,

    /// Attack settings shared by every trial.
    pub attack_config: AttackConfig,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            target: "vulnerable".to_string(),
            attack: "dhem".to_string(),
            profiles: ["vuln_0us", "vuln_10us", "vuln_50us", "vuln_100us", "no_leak"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            key_sizes: vec![64, 128],
            keys_per_size: 10,
            sample_counts: vec![10_000, 20_000, 40_000, 80_000, 160_000],
            max_samples: 160_000,
            seed: 42,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            attack_config: AttackConfig::default(),
        }
    }
}

impl CampaignConfig {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge overrides from `LAB_*` environment variables.
    ///
    /// Lists are comma separated. Unparseable values are ignored.
    pub fn from_env(mut self) -> Self {
        if let Some(seed) = parse_env::<u64>("LAB_SEED") {
            self = self.seed(seed);
        }
        if let Some(keys) = parse_env::<usize>("LAB_KEYS") {
            self = self.keys_per_size(keys);
        }
        if let Some(max) = parse_env::<usize>("LAB_MAX_SAMPLES") {
            self = self.max_samples(max);
        }
        if let Some(sizes) = parse_list_env::<u64>("LAB_KEY_SIZES") {
            self = self.key_sizes(sizes);
        }
        if let Some(counts) = parse_list_env::<usize>("LAB_SAMPLES") {
            self = self.sample_counts(counts);
        }
        if let Some(profiles) = parse_list_env::<String>("LAB_PROFILES") {
            self = self.profiles(profiles);
        }
        self
    }

    /// Set the target registry name.
    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.target = name.into();
        self
    }

    /// Set the attack registry name.
    pub fn attack(mut self, name: impl Into<String>) -> Self {
        self.attack = name.into();
        self
    }

    /// Set the profile names.
    pub fn profiles<S: Into<String>>(mut self, profiles: impl IntoIterator<Item = S>) -> Self {
        self.profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the key sizes.
    pub fn key_sizes(mut self, sizes: Vec<u64>) -> Self {
        self.key_sizes = sizes;
        self
    }

    /// Set the number of keys per size.
    pub fn keys_per_size(mut self, n: usize) -> Self {
        self.keys_per_size = n;
        self
    }

    /// Set the attacked prefix sizes.
    pub fn sample_counts(mut self, counts: Vec<usize>) -> Self {
        self.sample_counts = counts;
        self
    }

    /// Set the collected samples per key.
    pub fn max_samples(mut self, n: usize) -> Self {
        self.max_samples = n;
        self
    }

    /// Set the top-level seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the public exponent.
    pub fn public_exponent(mut self, e: u64) -> Self {
        self.public_exponent = e;
        self
    }

    /// Set the attack configuration.
    pub fn attack_config(mut self, config: AttackConfig) -> Self {
        self.attack_config = config;
        self
    }

    /// Check that every list is populated and every prefix fits the
    /// collected dataset.
    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() || self.key_sizes.is_empty() || self.sample_counts.is_empty() {
            return Err(LabError::domain(
                "campaign needs at least one profile, key size and sample count",
            ));
        }
        if self.keys_per_size == 0 {
            return Err(LabError::domain("keys per size must be positive"));
        }
        if let Some(&bad) = self
            .sample_counts
            .iter()
            .find(|&&count| count == 0 || count > self.max_samples)
        {
            return Err(LabError::domain(format!(
                "sample count {} outside 1..={}",
                bad, self.max_samples
            )));
        }
        Ok(())
    }

    /// Number of (profile, key size, key) trials.
    pub fn trial_count(&self) -> usize {
        self.profiles.len() * self.key_sizes.len() * self.keys_per_size
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}

fn parse_list_env<T: std::str::FromStr>(key: &str) -> Option<Vec<T>> {
    let raw = env::var(key).ok()?;
    let items: Option<Vec<T>> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect();
    items.filter(|v| !v.is_empty())
}
