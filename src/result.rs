//! Attack result types.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::config::Distinguisher;

/// How a bit of the recovered exponent was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitOrigin {
    /// Top bit, 1 by convention.
    Fixed,
    /// Chosen by the distinguisher.
    Measured,
    /// Bit 0, 1 because the exponent is odd.
    Inferred,
}

/// Decision for one exponent bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitHypothesis {
    /// Bit position, 0 = least significant.
    pub position: u64,

    /// Chosen value.
    pub guessed_value: bool,

    /// Normalized gap `|s0 - s1| / (s0 + s1)`, in `[0, 1]`.
    ///
    /// Fixed and inferred bits report 1.0.
    pub confidence: f64,

    /// Statistic under guess 0.
    pub statistic_0: f64,

    /// Statistic under guess 1.
    pub statistic_1: f64,

    /// How the bit was decided.
    pub origin: BitOrigin,
}

impl BitHypothesis {
    /// A bit decided without measurement.
    pub(crate) fn assumed(position: u64, origin: BitOrigin) -> Self {
        Self {
            position,
            guessed_value: true,
            confidence: 1.0,
            statistic_0: 0.0,
            statistic_1: 0.0,
            origin,
        }
    }

    /// Guessed value as 0 or 1.
    pub fn bit(&self) -> u8 {
        u8::from(self.guessed_value)
    }
}

/// Outcome of one attack run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Recovered exponent. When the run stopped early, unresolved low bits
    /// are zero.
    pub recovered_exponent: BigUint,

    /// Per-bit decisions, most significant first.
    pub per_bit: Vec<BitHypothesis>,

    /// The recovered exponent equals the ground truth. Set by
    /// [`AttackResult::score`]; an unscored result reports `false`.
    pub success: bool,

    /// The recovered exponent decrypts every verification probe.
    pub verified: bool,

    /// Bits decided, including fixed and inferred bits.
    pub bits_resolved: usize,

    /// Exponent length the attack targeted.
    pub exponent_bits: usize,

    /// Samples the attack consumed.
    pub samples_used: usize,

    /// Statistic used per bit.
    pub distinguisher: Distinguisher,

    /// Wall-clock seconds spent in the attack.
    pub attack_time_secs: f64,

    /// False when the run was cancelled before every bit was decided.
    pub completed: bool,
}

impl AttackResult {
    /// Exact comparison against the ground-truth exponent.
    pub fn matches(&self, ground_truth: &BigUint) -> bool {
        self.completed && &self.recovered_exponent == ground_truth
    }

    /// Score against the ground-truth exponent: `success` becomes
    /// [`AttackResult::matches`].
    pub fn score(&mut self, ground_truth: &BigUint) -> bool {
        self.success = self.matches(ground_truth);
        self.success
    }

    /// Consuming form of [`AttackResult::score`].
    pub fn scored(mut self, ground_truth: &BigUint) -> Self {
        self.score(ground_truth);
        self
    }

    /// Measured bits whose confidence is below `threshold`.
    pub fn low_confidence_bits(&self, threshold: f64) -> Vec<&BitHypothesis> {
        self.measured_bits()
            .filter(|b| b.confidence < threshold)
            .collect()
    }

    /// Mean confidence over measured bits, 0 when none were measured.
    pub fn mean_confidence(&self) -> f64 {
        let (sum, count) = self
            .measured_bits()
            .fold((0.0, 0usize), |(sum, count), b| (sum + b.confidence, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Bits chosen by the distinguisher.
    pub fn measured_bits(&self) -> impl Iterator<Item = &BitHypothesis> {
        self.per_bit
            .iter()
            .filter(|b| b.origin == BitOrigin::Measured)
    }

    /// Confidence of every decided bit, most significant first.
    pub fn confidences(&self) -> Vec<f64> {
        self.per_bit.iter().map(|b| b.confidence).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(position: u64, value: bool, confidence: f64) -> BitHypothesis {
        BitHypothesis {
            position,
            guessed_value: value,
            confidence,
            statistic_0: 1.0,
            statistic_1: 2.0,
            origin: BitOrigin::Measured,
        }
    }

    fn result() -> AttackResult {
        AttackResult {
            recovered_exponent: BigUint::from(0b1011u32),
            per_bit: vec![
                BitHypothesis::assumed(3, BitOrigin::Fixed),
                measured(2, false, 0.4),
                measured(1, true, 0.001),
                BitHypothesis::assumed(0, BitOrigin::Inferred),
            ],
            success: false,
            verified: true,
            bits_resolved: 4,
            exponent_bits: 4,
            samples_used: 100,
            distinguisher: Distinguisher::ResidualVariance,
            attack_time_secs: 0.1,
            completed: true,
        }
    }

    #[test]
    fn test_matches() {
        let r = result();
        assert!(r.matches(&BigUint::from(11u32)));
        assert!(!r.matches(&BigUint::from(9u32)));

        let partial = AttackResult {
            completed: false,
            ..result()
        };
        assert!(!partial.matches(&BigUint::from(11u32)));
    }

    #[test]
    fn test_success_requires_exact_ground_truth() {
        // A different exponent never scores, even when it verifies.
        let mut r = result();
        assert!(!r.success);
        assert!(!r.score(&BigUint::from(23u32)));
        assert!(!r.success);
        assert!(r.verified);
        assert!(r.score(&BigUint::from(11u32)));
        assert!(r.success);

        let partial = AttackResult {
            completed: false,
            ..result()
        };
        assert!(!partial.scored(&BigUint::from(11u32)).success);
    }

    #[test]
    fn test_confidence_summaries_skip_assumed_bits() {
        let r = result();
        assert_eq!(r.low_confidence_bits(0.01).len(), 1);
        assert_eq!(r.low_confidence_bits(0.01)[0].position, 1);
        assert!((r.mean_confidence() - 0.2005).abs() < 1e-12);
        assert_eq!(r.confidences().len(), 4);
        assert_eq!(r.per_bit[1].bit(), 0);
    }

    #[test]
    fn test_serializes() {
        let json = serde_json::to_string(&result()).unwrap();
        let back: AttackResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result());
    }
}
