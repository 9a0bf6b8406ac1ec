//! Campaign driver: key generation, collection and sample-count sweeps.
//!
//! Every (profile, key size, key index) triple gets one key and one dataset,
//! and every requested prefix of that dataset is one trial. Keys depend only
//! on the key size and index, so every profile is attacked on the same keys.
//! Keys run in parallel and are merged back into a fixed order. A failing
//! trial is recorded rather than aborting the campaign, and only a failure
//! before the attack (key generation, collection) touches every prefix.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::attack::{build_attack, CancelToken};
use crate::config::CampaignConfig;
use crate::dataset::{Collector, TimingDataset};
use crate::error::{LabError, Result};
use crate::key::KeyMaterial;
use crate::keygen::generate_keypair;
use crate::result::AttackResult;
use crate::statistics::{derive_seed, mean};
use crate::target::{self, build_target, LeakageProfile};
use crate::thread_pool::map_ordered;

/// Outcome of attacking one key at one sample count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Position in the campaign's deterministic order.
    pub trial_id: usize,
    /// Leakage profile name.
    pub profile: String,
    /// Modulus size in bits.
    pub key_size: u64,
    /// Key index within its size.
    pub key_index: usize,
    /// Seed the key was generated from.
    pub key_seed: u64,
    /// Prefix length attacked.
    pub sample_count: usize,
    /// Recovered exponent equals the ground truth.
    pub success: bool,
    /// Recovered exponent decrypts every verification probe.
    pub verified: bool,
    /// Bits decided by the attack.
    pub bits_resolved: usize,
    /// Per-bit confidences, most significant first.
    pub per_bit_confidence: Vec<f64>,
    /// Wall-clock seconds spent in the attack.
    pub attack_time_secs: f64,
    /// Wall-clock seconds spent collecting the key's dataset.
    pub collection_time_secs: f64,
    /// Why the trial failed, if it did.
    pub error: Option<String>,
}

/// Success rate at one sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Leakage profile name.
    pub profile: String,
    /// Modulus size in bits.
    pub key_size: u64,
    /// Prefix length attacked.
    pub sample_count: usize,
    /// Trials at this point.
    pub trials: usize,
    /// Trials that matched the ground truth exactly.
    pub successes: usize,
    /// Trials whose exponent passed functional verification.
    pub verified: usize,
    /// Trials that failed with an error.
    pub errors: usize,
    /// `successes / trials`.
    pub success_rate: f64,
    /// Mean per-bit confidence over trials without errors.
    pub mean_confidence: f64,
}

/// Everything a campaign produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    /// Configuration the campaign ran with.
    pub config: CampaignConfig,
    /// One record per (trial, sample count), in deterministic order.
    pub records: Vec<TrialRecord>,
    /// Aggregated success rates.
    pub summary: Vec<SweepPoint>,
    /// Wall-clock seconds for the whole campaign.
    pub total_time_secs: f64,
}

impl CampaignReport {
    /// Success rate at one sweep point.
    pub fn success_rate(&self, profile: &str, key_size: u64, sample_count: usize) -> Option<f64> {
        self.summary
            .iter()
            .find(|p| p.profile == profile && p.key_size == key_size && p.sample_count == sample_count)
            .map(|p| p.success_rate)
    }

    /// Records that carry an error.
    pub fn failed_records(&self) -> impl Iterator<Item = &TrialRecord> {
        self.records.iter().filter(|r| r.error.is_some())
    }
}

#[derive(Debug, Clone)]
struct TrialSpec {
    profile_index: usize,
    profile: LeakageProfile,
    key_size: u64,
    key_index: usize,
    key_seed: u64,
}

/// Campaign runner.
#[derive(Debug, Clone)]
pub struct Campaign {
    config: CampaignConfig,
    cancel: CancelToken,
}

impl Campaign {
    /// Create a campaign.
    pub fn new(config: CampaignConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Share a cancellation token with the running attacks.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Configuration.
    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    /// Run every trial.
    ///
    /// Fails only on an invalid configuration or unknown registry names;
    /// per-trial failures end up in [`TrialRecord::error`].
    pub fn run(&self) -> Result<CampaignReport> {
        let start = Instant::now();
        self.config.validate()?;
        if !target::registry()
            .iter()
            .any(|t| t.name == self.config.target)
        {
            return Err(LabError::UnknownConfiguration {
                kind: "target",
                name: self.config.target.clone(),
            });
        }
        if !crate::attack::registry()
            .iter()
            .any(|a| a.name == self.config.attack)
        {
            return Err(LabError::UnknownConfiguration {
                kind: "attack",
                name: self.config.attack.clone(),
            });
        }
        let profiles = self
            .config
            .profiles
            .iter()
            .map(|name| LeakageProfile::preset(name))
            .collect::<Result<Vec<_>>>()?;

        let specs = self.trial_specs(&profiles);
        info!(
            trials = specs.len(),
            sample_counts = ?self.config.sample_counts,
            seed = self.config.seed,
            "campaign started"
        );

        let mut records: Vec<TrialRecord> = map_ordered(&specs, |spec| self.run_trial(spec))
            .into_iter()
            .flatten()
            .collect();
        for (id, record) in records.iter_mut().enumerate() {
            record.trial_id = id;
        }

        let summary = summarize(&self.config, &records);
        let total_time_secs = start.elapsed().as_secs_f64();
        info!(
            records = records.len(),
            failed = records.iter().filter(|r| r.error.is_some()).count(),
            secs = total_time_secs,
            "campaign finished"
        );
        Ok(CampaignReport {
            config: self.config.clone(),
            records,
            summary,
            total_time_secs,
        })
    }

    fn trial_specs(&self, profiles: &[LeakageProfile]) -> Vec<TrialSpec> {
        let mut specs = Vec::with_capacity(self.config.trial_count());
        for (profile_index, profile) in profiles.iter().enumerate() {
            for (size_index, &key_size) in self.config.key_sizes.iter().enumerate() {
                for key_index in 0..self.config.keys_per_size {
                    let slot = (size_index * self.config.keys_per_size + key_index) as u64;
                    specs.push(TrialSpec {
                        profile_index,
                        profile: profile.clone(),
                        key_size,
                        key_index,
                        key_seed: derive_seed(self.config.seed, slot),
                    });
                }
            }
        }
        specs
    }

    fn run_trial(&self, spec: &TrialSpec) -> Vec<TrialRecord> {
        let (key, dataset) = match self.prepare(spec) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(
                    profile = %spec.profile.name,
                    key_size = spec.key_size,
                    key_index = spec.key_index,
                    error = %e,
                    "key setup failed"
                );
                return self
                    .config
                    .sample_counts
                    .iter()
                    .map(|&sample_count| TrialRecord::failed(spec, sample_count, 0.0, &e))
                    .collect();
            }
        };
        let collection_time_secs = dataset.metadata().collection_time_secs;

        self.config
            .sample_counts
            .iter()
            .map(|&sample_count| match self.attack_prefix(&key, &dataset, sample_count) {
                Ok(result) => {
                    info!(
                        profile = %spec.profile.name,
                        key_size = spec.key_size,
                        key_index = spec.key_index,
                        sample_count,
                        success = result.success,
                        verified = result.verified,
                        "trial finished"
                    );
                    TrialRecord {
                        trial_id: 0,
                        profile: spec.profile.name.clone(),
                        key_size: spec.key_size,
                        key_index: spec.key_index,
                        key_seed: spec.key_seed,
                        sample_count,
                        success: result.success,
                        verified: result.verified,
                        bits_resolved: result.bits_resolved,
                        per_bit_confidence: result.confidences(),
                        attack_time_secs: result.attack_time_secs,
                        collection_time_secs,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(
                        profile = %spec.profile.name,
                        key_size = spec.key_size,
                        key_index = spec.key_index,
                        sample_count,
                        error = %e,
                        "trial failed"
                    );
                    TrialRecord::failed(spec, sample_count, collection_time_secs, &e)
                }
            })
            .collect()
    }

    /// Generate the key and collect its full dataset.
    fn prepare(&self, spec: &TrialSpec) -> Result<(KeyMaterial, TimingDataset)> {
        let config = &self.config;
        let key = generate_keypair(spec.key_size, config.public_exponent, spec.key_seed)?;
        let sample_seed = derive_seed(spec.key_seed, 1);
        let noise_seed = derive_seed(spec.key_seed, 2 + spec.profile_index as u64);

        let target = build_target(
            &config.target,
            key.clone(),
            spec.profile.clone(),
            config.attack_config.shape,
            noise_seed,
        )?;
        let dataset = Collector::new(target).collect(config.max_samples, sample_seed)?;
        Ok((key, dataset))
    }

    /// Attack one prefix and score it against the ground truth.
    fn attack_prefix(
        &self,
        key: &KeyMaterial,
        dataset: &TimingDataset,
        sample_count: usize,
    ) -> Result<AttackResult> {
        let attack = build_attack(
            &self.config.attack,
            dataset.prefix(sample_count),
            key.public(),
            key.exponent_bits() as usize,
            self.config.attack_config.clone(),
        )?;
        Ok(attack.attack_with_cancel(&self.cancel)?.scored(key.d()))
    }
}

impl TrialRecord {
    fn failed(
        spec: &TrialSpec,
        sample_count: usize,
        collection_time_secs: f64,
        error: &LabError,
    ) -> Self {
        Self {
            trial_id: 0,
            profile: spec.profile.name.clone(),
            key_size: spec.key_size,
            key_index: spec.key_index,
            key_seed: spec.key_seed,
            sample_count,
            success: false,
            verified: false,
            bits_resolved: 0,
            per_bit_confidence: Vec::new(),
            attack_time_secs: 0.0,
            collection_time_secs,
            error: Some(error.to_string()),
        }
    }
}

fn summarize(config: &CampaignConfig, records: &[TrialRecord]) -> Vec<SweepPoint> {
    let mut points = Vec::new();
    for profile in &config.profiles {
        for &key_size in &config.key_sizes {
            for &sample_count in &config.sample_counts {
                let matching: Vec<&TrialRecord> = records
                    .iter()
                    .filter(|r| {
                        &r.profile == profile
                            && r.key_size == key_size
                            && r.sample_count == sample_count
                    })
                    .collect();
                let trials = matching.len();
                let successes = matching.iter().filter(|r| r.success).count();
                let ok: Vec<&&TrialRecord> = matching.iter().filter(|r| r.error.is_none()).collect();
                let mean_confidence = if ok.is_empty() {
                    0.0
                } else {
                    ok.iter().map(|r| mean(&r.per_bit_confidence)).sum::<f64>() / ok.len() as f64
                };
                points.push(SweepPoint {
                    profile: profile.clone(),
                    key_size,
                    sample_count,
                    trials,
                    successes,
                    verified: matching.iter().filter(|r| r.verified).count(),
                    errors: trials - ok.len(),
                    success_rate: if trials == 0 {
                        0.0
                    } else {
                        successes as f64 / trials as f64
                    },
                    mean_confidence,
                });
            }
        }
    }
    points
}
