//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use crate::campaign::{CampaignReport, SweepPoint};
use crate::dataset::DatasetSummary;
use crate::result::{AttackResult, BitOrigin};

/// Bits below this confidence are highlighted.
const WEAK_CONFIDENCE: f64 = 0.01;

/// Format an attack result for human-readable terminal output.
pub fn format_attack_result(result: &AttackResult) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("rsa-timing-lab attack\n");
    output.push_str(&sep);
    output.push_str("\n\n");

    output.push_str(&format!(
        "  Samples: {}   Distinguisher: {}\n",
        result.samples_used,
        result.distinguisher.name()
    ));
    output.push_str(&format!(
        "  Bits resolved: {}/{}   Time: {:.2} s\n\n",
        result.bits_resolved, result.exponent_bits, result.attack_time_secs
    ));

    if !result.completed {
        output.push_str(&format!("  {}\n\n", "\u{26A0} Attack cancelled".yellow().bold()));
    } else if result.success {
        output.push_str(&format!("  {}\n\n", "\u{2713} Exponent recovered".red().bold()));
    } else if result.verified {
        output.push_str(&format!(
            "  {}\n\n",
            "\u{2713} Exponent inverts the public key".red().bold()
        ));
    } else {
        output.push_str(&format!("  {}\n\n", "\u{2717} Recovery failed".green().bold()));
    }

    output.push_str(&format!("    Recovered: {:#x}\n", result.recovered_exponent));
    output.push_str(&format!(
        "    Mean confidence: {:.4}\n",
        result.mean_confidence()
    ));
    let weak = result.low_confidence_bits(WEAK_CONFIDENCE);
    if !weak.is_empty() {
        let positions: Vec<String> = weak.iter().map(|b| b.position.to_string()).collect();
        output.push_str(&format!(
            "    {} {}\n",
            "Low-confidence bits:".yellow(),
            positions.join(", ")
        ));
    }
    output.push('\n');
    output.push_str(&format!("    Bits: {}\n", bit_strip(result)));
    output.push('\n');
    output.push_str(&sep);
    output.push('\n');

    output
}

/// One character per decided bit: the value, dimmed when assumed, yellow
/// when the decision was weak.
fn bit_strip(result: &AttackResult) -> String {
    result
        .per_bit
        .iter()
        .map(|b| {
            let c = if b.guessed_value { "1" } else { "0" };
            match b.origin {
                BitOrigin::Fixed | BitOrigin::Inferred => c.dimmed().to_string(),
                BitOrigin::Measured if b.confidence < WEAK_CONFIDENCE => c.yellow().to_string(),
                BitOrigin::Measured => c.to_string(),
            }
        })
        .collect()
}

/// Format dataset statistics on one line.
pub fn format_dataset_summary(summary: &DatasetSummary) -> String {
    format!(
        "  {} samples, mean {:.1} \u{00B5}s, sd {:.1} \u{00B5}s, range {:.1}\u{2013}{:.1} \u{00B5}s, lag-1 r = {:.3}\n",
        summary.samples,
        summary.mean_ns / 1_000.0,
        summary.std_ns / 1_000.0,
        summary.min_ns / 1_000.0,
        summary.max_ns / 1_000.0,
        summary.lag1_autocorrelation
    )
}

/// Format a campaign's success-rate table.
pub fn format_campaign_summary(report: &CampaignReport) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("rsa-timing-lab campaign\n");
    output.push_str(&sep);
    output.push('\n');
    output.push_str(&format!(
        "  Seed: {}   Trials: {}   Time: {:.1} s\n\n",
        report.config.seed,
        report.records.len(),
        report.total_time_secs
    ));
    output.push_str(&format!(
        "  {:<12} {:>6} {:>9} {:>8} {:>8} {:>8}\n",
        "profile", "bits", "samples", "success", "rate", "conf"
    ));

    for point in &report.summary {
        output.push_str(&format!(
            "  {:<12} {:>6} {:>9} {:>8} {} {:>8.4}\n",
            point.profile,
            point.key_size,
            point.sample_count,
            format!("{}/{}", point.successes, point.trials),
            format_rate(point),
            point.mean_confidence
        ));
    }

    let failed = report.failed_records().count();
    if failed > 0 {
        output.push('\n');
        output.push_str(&format!(
            "  {}\n",
            format!("\u{26A0} {} trial records failed", failed).yellow().bold()
        ));
    }
    output.push_str(&sep);
    output.push('\n');
    output
}

fn format_rate(point: &SweepPoint) -> String {
    let text = format!("{:>7.0}%", point.success_rate * 100.0);
    if point.errors > 0 {
        text.yellow().to_string()
    } else if point.success_rate >= 0.5 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CampaignConfig, Distinguisher};
    use crate::result::BitHypothesis;
    use num_bigint::BigUint;

    fn make_result(completed: bool) -> AttackResult {
        AttackResult {
            recovered_exponent: BigUint::from(0b111u32),
            per_bit: vec![
                BitHypothesis::assumed(2, BitOrigin::Fixed),
                BitHypothesis {
                    position: 1,
                    guessed_value: true,
                    confidence: 0.001,
                    statistic_0: 1.0,
                    statistic_1: 1.002,
                    origin: BitOrigin::Measured,
                },
                BitHypothesis::assumed(0, BitOrigin::Inferred),
            ],
            success: completed,
            verified: completed,
            bits_resolved: 3,
            exponent_bits: 3,
            samples_used: 10_000,
            distinguisher: Distinguisher::ResidualVariance,
            attack_time_secs: 0.2,
            completed,
        }
    }

    #[test]
    fn test_format_attack_result() {
        colored::control::set_override(false);
        let output = format_attack_result(&make_result(true));
        assert!(output.contains("Exponent recovered"));
        assert!(output.contains("Recovered: 0x7"));
        assert!(output.contains("Low-confidence bits: 1"));
        assert!(output.contains("Bits: 111"));

        let output = format_attack_result(&make_result(false));
        assert!(output.contains("Attack cancelled"));

        let unscored = AttackResult {
            success: false,
            ..make_result(true)
        };
        let output = format_attack_result(&unscored);
        assert!(output.contains("Exponent inverts the public key"));
        assert!(!output.contains("Exponent recovered"));
    }

    #[test]
    fn test_format_campaign_summary() {
        colored::control::set_override(false);
        let report = CampaignReport {
            config: CampaignConfig::default(),
            records: Vec::new(),
            summary: vec![SweepPoint {
                profile: "vuln_50us".to_string(),
                key_size: 64,
                sample_count: 160_000,
                trials: 10,
                successes: 9,
                verified: 9,
                errors: 0,
                success_rate: 0.9,
                mean_confidence: 0.2,
            }],
            total_time_secs: 3.0,
        };
        let output = format_campaign_summary(&report);
        assert!(output.contains("vuln_50us"));
        assert!(output.contains("9/10"));
        assert!(output.contains("90%"));
        assert!(output.contains("Seed: 42"));
    }
}
