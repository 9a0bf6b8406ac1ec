//! Greedy most-significant-first recovery of the private exponent.

use std::time::Instant;

use num_bigint::BigUint;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::distinguisher::{decide, remove_settled_cost, score};
use super::predict::{PredictionModel, SampleState};
use super::ExponentAttack;
use crate::arith::{from_bits_msb_first, is_odd, random_below, Montgomery};
use crate::config::AttackConfig;
use crate::error::{LabError, Result};
use crate::key::PublicKey;
use crate::result::{AttackResult, BitHypothesis, BitOrigin};
use crate::thread_pool::map_ordered;
use crate::types::TimingSample;

/// Seed of the verification probe stream.
const VERIFICATION_SEED: u64 = 0x7665_7269_6679;

/// Timing attack over one dataset.
///
/// Holds only public parameters and the samples. Every sample's ladder is
/// replayed under the bits recovered so far; at each position both guesses
/// are scored and the better one is kept for good.
///
/// The attack never sees the private exponent, so the result it returns is
/// unscored: `success` stays `false` until the caller hands the ground truth
/// to [`AttackResult::score`]. `verified` records whether the recovered
/// exponent inverts the public key on a set of probe messages.
///
/// # Example
///
/// ```ignore
/// use rsa_timing_lab::{AttackConfig, TimingAttack};
///
/// let attack = TimingAttack::from_data(dataset.samples(), &public, exponent_bits, AttackConfig::default())?;
/// let result = attack.attack()?.scored(key.d());
/// println!("recovered {} bits, exact: {}", result.bits_resolved, result.success);
/// ```
#[derive(Debug, Clone)]
pub struct TimingAttack<'a> {
    samples: &'a [TimingSample],
    public: PublicKey,
    exponent_bits: usize,
    config: AttackConfig,
    model: PredictionModel,
}

impl<'a> TimingAttack<'a> {
    /// Set up an attack on `samples` against `public`, where the private
    /// exponent is `exponent_bits` long.
    ///
    /// `config.max_samples` truncates `samples` to a prefix.
    ///
    /// # Errors
    ///
    /// - `InconsistentKey` if `n` or `e` is even
    /// - `Domain` if `exponent_bits` is not in `2..=bits(n)` or an input is
    ///   not below `n`
    /// - `InsufficientData` if fewer than `config.min_samples` samples remain
    pub fn from_data(
        samples: &'a [TimingSample],
        public: &PublicKey,
        exponent_bits: usize,
        config: AttackConfig,
    ) -> Result<Self> {
        if !is_odd(&public.n) {
            return Err(LabError::inconsistent_key("modulus (n) must be odd"));
        }
        if !is_odd(&public.e) {
            return Err(LabError::inconsistent_key(
                "even public exponent (e) has no inverse modulo lambda(n)",
            ));
        }
        let ctx = Montgomery::new(&public.n)?;

        let modulus_bits = public.modulus_bits() as usize;
        if exponent_bits < 2 || exponent_bits > modulus_bits {
            return Err(LabError::domain(format!(
                "exponent length {} outside 2..={} for a {}-bit modulus",
                exponent_bits, modulus_bits, modulus_bits
            )));
        }

        let samples = match config.max_samples {
            Some(max) => &samples[..max.min(samples.len())],
            None => samples,
        };
        let required = config.min_samples.max(1);
        if samples.len() < required {
            return Err(LabError::InsufficientData {
                available: samples.len(),
                required,
            });
        }
        if samples.iter().any(|s| s.input >= public.n) {
            return Err(LabError::domain("sample input not below the modulus"));
        }

        Ok(Self {
            samples,
            public: public.clone(),
            exponent_bits,
            model: PredictionModel::new(ctx, config.shape),
            config,
        })
    }

    /// Samples the attack will consume.
    pub fn samples_used(&self) -> usize {
        self.samples.len()
    }

    /// Attack configuration.
    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// Run to completion.
    pub fn attack(&self) -> Result<AttackResult> {
        self.attack_with_cancel(&CancelToken::new())
    }

    /// Run until done or until `cancel` is set.
    ///
    /// A cancelled run returns the bits decided so far with
    /// `completed = false` and `verified = false`.
    pub fn attack_with_cancel(&self, cancel: &CancelToken) -> Result<AttackResult> {
        let start = Instant::now();
        let len = self.exponent_bits;
        let top = (len - 1) as u64;
        let distinguisher = self.config.distinguisher;

        let times: Vec<f64> = self.samples.iter().map(|s| s.time_ns).collect();
        let mut states: Vec<SampleState> =
            map_ordered(self.samples, |s| self.model.init(&s.input, top));

        let mut bits = Vec::with_capacity(len);
        let mut per_bit = Vec::with_capacity(len);
        bits.push(true);
        per_bit.push(BitHypothesis::assumed(top, BitOrigin::Fixed));

        let mut completed = true;
        for position in (1..top).rev() {
            if cancel.is_cancelled() {
                completed = false;
                break;
            }
            let predictions = map_ordered(&states, |state| self.model.predict(state, position));
            let residuals = remove_settled_cost(&times, &predictions);
            let s0 = score(distinguisher, &residuals, &predictions, 0);
            let s1 = score(distinguisher, &residuals, &predictions, 1);
            let (guess, confidence) = decide(distinguisher, s0, s1);

            debug!(position, guess, confidence, s0, s1, "bit decided");

            for (state, prediction) in states.iter_mut().zip(predictions) {
                state.commit(prediction, guess);
            }
            bits.push(guess == 1);
            per_bit.push(BitHypothesis {
                position,
                guessed_value: guess == 1,
                confidence,
                statistic_0: s0,
                statistic_1: s1,
                origin: BitOrigin::Measured,
            });
        }

        if completed {
            bits.push(true);
            per_bit.push(BitHypothesis::assumed(0, BitOrigin::Inferred));
        }
        let bits_resolved = bits.len();
        bits.resize(len, false);
        let recovered_exponent = from_bits_msb_first(&bits);
        let verified = completed && self.verify(&recovered_exponent);

        let result = AttackResult {
            recovered_exponent,
            per_bit,
            success: false,
            verified,
            bits_resolved,
            exponent_bits: len,
            samples_used: self.samples.len(),
            distinguisher,
            attack_time_secs: start.elapsed().as_secs_f64(),
            completed,
        };

        let low = result
            .low_confidence_bits(self.config.low_confidence_threshold)
            .len();
        if low > 0 {
            warn!(
                low_confidence_bits = low,
                threshold = self.config.low_confidence_threshold,
                "attack finished with low-confidence bits"
            );
        }
        info!(
            samples = result.samples_used,
            bits_resolved,
            verified,
            completed,
            mean_confidence = result.mean_confidence(),
            secs = result.attack_time_secs,
            "attack finished"
        );
        Ok(result)
    }

    /// `(m^e)^d == m (mod n)` for every probe message.
    fn verify(&self, d: &BigUint) -> bool {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(VERIFICATION_SEED);
        let span = &self.public.n - 2u32;
        (0..self.config.verification_probes.max(1)).all(|_| {
            let probe = random_below(&mut rng, &span) + 2u32;
            self.public.decrypts_with(d, &probe)
        })
    }
}

impl ExponentAttack for TimingAttack<'_> {
    fn name(&self) -> &'static str {
        "dhem"
    }

    fn attack_with_cancel(&self, cancel: &CancelToken) -> Result<AttackResult> {
        TimingAttack::attack_with_cancel(self, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Collector;
    use crate::key::KeyMaterial;
    use crate::keygen::generate_keypair;
    use crate::target::{LeakageProfile, VulnerableRsa};

    fn sample(input: u32, time_ns: f64) -> TimingSample {
        TimingSample::new(BigUint::from(input), time_ns)
    }

    fn toy_public() -> PublicKey {
        PublicKey::new(BigUint::from(3233u32), BigUint::from(17u32)).unwrap()
    }

    #[test]
    fn test_empty_dataset() {
        let err = TimingAttack::from_data(&[], &toy_public(), 9, AttackConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            LabError::InsufficientData {
                available: 0,
                required: 100
            }
        ));
    }

    #[test]
    fn test_even_parameters_rejected() {
        let samples = vec![sample(5, 1.0); 200];
        let even_n = PublicKey {
            n: BigUint::from(3234u32),
            e: BigUint::from(17u32),
        };
        let even_e = PublicKey {
            n: BigUint::from(3233u32),
            e: BigUint::from(16u32),
        };
        for public in [even_n, even_e] {
            let err = TimingAttack::from_data(&samples, &public, 9, AttackConfig::default())
                .unwrap_err();
            assert!(matches!(err, LabError::InconsistentKey { .. }));
        }
    }

    #[test]
    fn test_exponent_length_checked() {
        let samples = vec![sample(5, 1.0); 200];
        for bad in [0, 1, 13] {
            let err = TimingAttack::from_data(&samples, &toy_public(), bad, AttackConfig::default())
                .unwrap_err();
            assert!(matches!(err, LabError::Domain { .. }));
        }
    }

    #[test]
    fn test_input_above_modulus_rejected() {
        let mut samples = vec![sample(5, 1.0); 200];
        samples.push(sample(4000, 1.0));
        let err = TimingAttack::from_data(&samples, &toy_public(), 9, AttackConfig::default())
            .unwrap_err();
        assert!(matches!(err, LabError::Domain { .. }));
    }

    #[test]
    fn test_max_samples_takes_prefix() {
        let samples = vec![sample(5, 1.0); 500];
        let attack = TimingAttack::from_data(
            &samples,
            &toy_public(),
            9,
            AttackConfig::default().max_samples(150),
        )
        .unwrap();
        assert_eq!(attack.samples_used(), 150);

        let err = TimingAttack::from_data(
            &samples,
            &toy_public(),
            9,
            AttackConfig::default().max_samples(50),
        )
        .unwrap_err();
        assert!(matches!(err, LabError::InsufficientData { available: 50, .. }));
    }

    fn leaky_run(bits: u64, samples: usize, seed: u64) -> (KeyMaterial, crate::dataset::TimingDataset) {
        let key = generate_keypair(bits, 65537, seed).unwrap();
        let profile = LeakageProfile::new("test").extra_reduction_us(50.0).gaussian_noise_us(5.0);
        let target = VulnerableRsa::new(key.clone(), profile, seed + 1).unwrap();
        let data = Collector::new(target).collect(samples, seed + 2).unwrap();
        (key, data)
    }

    #[test]
    fn test_recovers_small_key() {
        let (key, data) = leaky_run(32, 20_000, 7);
        let attack = TimingAttack::from_data(
            data.samples(),
            key.public(),
            key.exponent_bits() as usize,
            AttackConfig::default(),
        )
        .unwrap();
        let mut result = attack.attack().unwrap();
        assert!(result.completed);
        assert_eq!(result.bits_resolved, key.exponent_bits() as usize);
        assert!(result.verified);
        assert!(!result.success, "unscored results never claim success");
        assert!(result.score(key.d()));
        assert_eq!(result.per_bit.first().map(|b| b.origin), Some(BitOrigin::Fixed));
        assert_eq!(result.per_bit.last().map(|b| b.origin), Some(BitOrigin::Inferred));
    }

    #[test]
    fn test_cancelled_attack_is_partial() {
        let (key, data) = leaky_run(32, 1_000, 3);
        let attack = TimingAttack::from_data(
            data.samples(),
            key.public(),
            key.exponent_bits() as usize,
            AttackConfig::default(),
        )
        .unwrap();
        let token = CancelToken::new();
        token.cancel();
        let result = attack.attack_with_cancel(&token).unwrap().scored(key.d());
        assert!(!result.completed);
        assert!(!result.verified);
        assert!(!result.success);
        assert_eq!(result.bits_resolved, 1);
        assert_eq!(result.recovered_exponent.bits(), key.exponent_bits());
        assert!(!result.matches(key.d()));
    }
}
