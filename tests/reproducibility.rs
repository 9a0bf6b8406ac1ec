//! Same seeds, same bytes.

use num_bigint::BigUint;
use rsa_timing_lab::output::to_json;
use rsa_timing_lab::{
    generate_keypair, AttackConfig, Campaign, CampaignConfig, Collector, LeakageProfile, TimedRsa,
    VulnerableRsa,
};

fn profile() -> LeakageProfile {
    LeakageProfile::preset("vuln_50us").unwrap()
}

/// Two targets built with the same seed time the same input identically.
#[test]
fn target_timing_is_deterministic() {
    let key = generate_keypair(64, 65537, 42).unwrap();
    let mut a = VulnerableRsa::new(key.clone(), profile(), 9).unwrap();
    let mut b = VulnerableRsa::new(key.clone(), profile(), 9).unwrap();
    for m in [0u32, 1, 12345, 987_654_321] {
        let m = BigUint::from(m);
        assert_eq!(
            a.timed_decrypt(&m).unwrap().time_ns,
            b.timed_decrypt(&m).unwrap().time_ns
        );
    }
}

/// Key generation depends only on its seed.
#[test]
fn keygen_is_deterministic() {
    let a = generate_keypair(128, 65537, 17).unwrap();
    let b = generate_keypair(128, 65537, 17).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, generate_keypair(128, 65537, 18).unwrap());
}

/// Datasets serialize to identical bytes when collected twice.
#[test]
fn datasets_are_byte_identical() {
    let key = generate_keypair(64, 65537, 42).unwrap();
    let collect = || {
        let target = VulnerableRsa::new(key.clone(), profile(), 1).unwrap();
        Collector::new(target).collect(2_000, 2).unwrap()
    };
    let (a, b) = (collect(), collect());
    assert_eq!(to_json(a.samples()).unwrap(), to_json(b.samples()).unwrap());
}

/// Two campaign runs agree on every outcome.
#[test]
fn campaign_is_reproducible() {
    let config = CampaignConfig::default()
        .profiles(["vuln_50us", "no_leak"])
        .key_sizes(vec![24, 32])
        .keys_per_size(2)
        .sample_counts(vec![1_000, 3_000])
        .max_samples(3_000)
        .seed(42)
        .attack_config(AttackConfig::default().verification_probes(4));

    let first = Campaign::new(config.clone()).run().unwrap();
    let second = Campaign::new(config).run().unwrap();

    assert_eq!(first.records.len(), 2 * 2 * 2 * 2);
    for (a, b) in first.records.iter().zip(&second.records) {
        assert_eq!(a.trial_id, b.trial_id);
        assert_eq!(a.key_seed, b.key_seed);
        assert_eq!(a.success, b.success);
        assert_eq!(a.verified, b.verified);
        assert_eq!(a.per_bit_confidence, b.per_bit_confidence);
        assert_eq!(a.error, b.error);
    }
    let rates = |r: &rsa_timing_lab::CampaignReport| {
        r.summary.iter().map(|p| p.success_rate).collect::<Vec<_>>()
    };
    assert_eq!(rates(&first), rates(&second));
}
