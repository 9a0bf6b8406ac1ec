//! Toy-scale seeded RSA key generation.
//!
//! Keys are deliberately small (tens to a couple hundred bits) so that an
//! attack over hundreds of thousands of samples stays tractable. The same
//! seed always yields the same key.

use num_bigint::BigUint;
use num_traits::One;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use crate::arith::{gcd, is_probable_prime, lcm, random_below};
use crate::error::{LabError, Result};
use crate::key::KeyMaterial;

/// Default public exponent (F4).
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65_537;

/// Smallest supported modulus size.
pub const MIN_KEY_BITS: u64 = 16;

/// Candidate pairs tried before giving up.
const MAX_ATTEMPTS: usize = 10_000;

/// Miller-Rabin rounds for candidate primes.
const PRIME_ROUNDS: usize = 24;

/// Generate a key pair whose modulus has exactly `bits` bits.
///
/// # Errors
///
/// `Domain` if `bits` is below [`MIN_KEY_BITS`] or `e` is even, below 3 or
/// too large for the modulus; `KeyGeneration` if no suitable pair turns up
/// within the attempt budget.
pub fn generate_keypair(bits: u64, public_exponent: u64, seed: u64) -> Result<KeyMaterial> {
    if bits < MIN_KEY_BITS {
        return Err(LabError::domain(format!(
            "key size must be at least {} bits, got {}",
            MIN_KEY_BITS, bits
        )));
    }
    if public_exponent < 3 || public_exponent % 2 == 0 {
        return Err(LabError::domain(
            "public exponent must be odd and at least 3",
        ));
    }
    let e = BigUint::from(public_exponent);
    if e.bits() >= bits {
        return Err(LabError::domain(format!(
            "public exponent {} does not fit below a {}-bit modulus",
            public_exponent, bits
        )));
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let p_bits = bits / 2;
    let q_bits = bits - p_bits;
    let one = BigUint::one();

    for attempt in 0..MAX_ATTEMPTS {
        let p = random_prime(p_bits, &mut rng);
        let q = random_prime(q_bits, &mut rng);
        if p == q {
            continue;
        }
        let n = &p * &q;
        if n.bits() != bits {
            continue;
        }
        let lambda = lcm(&(&p - &one), &(&q - &one));
        if !gcd(&e, &lambda).is_one() {
            continue;
        }
        debug!(bits, attempt, "generated key pair");
        return KeyMaterial::from_primes(p, q, e);
    }

    Err(LabError::KeyGeneration {
        bits,
        attempts: MAX_ATTEMPTS,
    })
}

/// Random prime with exactly `bits` bits (top and bottom bit forced).
fn random_prime(bits: u64, rng: &mut Xoshiro256PlusPlus) -> BigUint {
    let top = BigUint::one() << (bits - 1);
    loop {
        let candidate = random_below(rng, &top) | &top | BigUint::one();
        if is_probable_prime(&candidate, PRIME_ROUNDS, rng) {
            return candidate;
        }
    }
}
