//! Error conditions reported to the caller.

use num_bigint::BigUint;
use rsa_timing_lab::{
    generate_keypair, AttackConfig, Collector, KeyMaterial, LabError, LeakageProfile, PublicKey,
    TimedRsa, TimingAttack, TimingSample, VulnerableRsa,
};

/// An empty dataset cannot be attacked.
#[test]
fn empty_dataset_is_insufficient() {
    let key = generate_keypair(32, 65537, 1).unwrap();
    let err = TimingAttack::from_data(&[], key.public(), 32, AttackConfig::default()).unwrap_err();
    assert!(matches!(err, LabError::InsufficientData { available: 0, .. }));
}

/// Fewer samples than the configured minimum is insufficient too.
#[test]
fn small_dataset_is_insufficient() {
    let key = generate_keypair(32, 65537, 1).unwrap();
    let target = VulnerableRsa::new(key.clone(), LeakageProfile::default(), 2).unwrap();
    let dataset = Collector::new(target).collect(50, 3).unwrap();
    let err = TimingAttack::from_data(
        dataset.samples(),
        key.public(),
        key.exponent_bits() as usize,
        AttackConfig::default().min_samples(51),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LabError::InsufficientData {
            available: 50,
            required: 51
        }
    ));
}

/// An even modulus or an even public exponent is inconsistent.
#[test]
fn even_parameters_are_inconsistent() {
    let samples: Vec<TimingSample> = (1u32..200)
        .map(|m| TimingSample::new(BigUint::from(m), 1_000.0))
        .collect();
    let even_n = PublicKey {
        n: BigUint::from(1_000_000u32),
        e: BigUint::from(65537u32),
    };
    let even_e = PublicKey {
        n: BigUint::from(1_000_001u32),
        e: BigUint::from(65536u32),
    };
    for public in [even_n, even_e] {
        let err = TimingAttack::from_data(&samples, &public, 16, AttackConfig::default())
            .unwrap_err();
        assert!(matches!(err, LabError::InconsistentKey { .. }), "got {:?}", err);
    }

    assert!(matches!(
        PublicKey::new(BigUint::from(1_000_000u32), BigUint::from(65537u32)),
        Err(LabError::InconsistentKey { .. })
    ));
}

/// Inputs outside [0, n) are rejected by the target.
#[test]
fn out_of_range_input_is_domain_error() {
    let key = generate_keypair(32, 65537, 1).unwrap();
    let mut target = VulnerableRsa::new(key.clone(), LeakageProfile::default(), 2).unwrap();
    let err = target.timed_decrypt(&(key.n() + 1u32)).unwrap_err();
    assert!(matches!(err, LabError::Domain { .. }));
}

/// Key material whose exponents do not invert is rejected.
#[test]
fn mismatched_private_exponent_is_rejected() {
    let err = KeyMaterial::new(
        BigUint::from(3233u32),
        BigUint::from(17u32),
        BigUint::from(415u32),
        BigUint::from(61u32),
        BigUint::from(53u32),
    )
    .unwrap_err();
    assert!(matches!(err, LabError::InconsistentKey { .. }));
}

/// Unknown profile names come back as configuration errors.
#[test]
fn unknown_profile_is_reported() {
    let err = LeakageProfile::preset("vuln_1ms").unwrap_err();
    assert_eq!(err.to_string(), "unknown profile configuration `vuln_1ms`");
}
