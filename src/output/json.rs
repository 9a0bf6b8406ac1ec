//! JSON serialization for attack results and campaign reports.

use serde::Serialize;

use crate::campaign::TrialRecord;
use crate::error::Result;

/// Serialize to a compact JSON string.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Serialize to a pretty-printed JSON string.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One compact JSON object per trial record, newline separated.
pub fn to_json_lines(records: &[TrialRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Distinguisher;
    use crate::result::{AttackResult, BitHypothesis, BitOrigin};
    use num_bigint::BigUint;

    fn make_result() -> AttackResult {
        AttackResult {
            recovered_exponent: BigUint::from(0b101u32),
            per_bit: vec![
                BitHypothesis::assumed(2, BitOrigin::Fixed),
                BitHypothesis {
                    position: 1,
                    guessed_value: false,
                    confidence: 0.25,
                    statistic_0: 3.0,
                    statistic_1: 5.0,
                    origin: BitOrigin::Measured,
                },
                BitHypothesis::assumed(0, BitOrigin::Inferred),
            ],
            success: true,
            verified: true,
            bits_resolved: 3,
            exponent_bits: 3,
            samples_used: 1_000,
            distinguisher: Distinguisher::ResidualVariance,
            attack_time_secs: 0.5,
            completed: true,
        }
    }

    fn make_record(trial_id: usize) -> TrialRecord {
        TrialRecord {
            trial_id,
            profile: "vuln_50us".to_string(),
            key_size: 64,
            key_index: 0,
            key_seed: 1,
            sample_count: 10_000,
            success: false,
            verified: false,
            bits_resolved: 63,
            per_bit_confidence: vec![1.0, 0.2],
            attack_time_secs: 1.0,
            collection_time_secs: 2.0,
            error: None,
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&make_result()).unwrap();
        assert!(json.contains("\"confidence\":0.25"));
        assert!(json.contains("\"origin\":\"Measured\""));
        assert!(json.contains("\"success\":true"));
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json_pretty(&make_result()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("recovered_exponent"));
    }

    #[test]
    fn test_json_lines() {
        let lines = to_json_lines(&[make_record(0), make_record(1)]).unwrap();
        assert_eq!(lines.lines().count(), 2);
        let back: TrialRecord = serde_json::from_str(lines.lines().nth(1).unwrap()).unwrap();
        assert_eq!(back, make_record(1));
    }
}
