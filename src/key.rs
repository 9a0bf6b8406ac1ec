//! RSA key material.
//!
//! [`PublicKey`] is all the attack engine ever sees. [`KeyMaterial`] adds
//! the private exponent and factors; it is owned by the target and by the
//! campaign driver for ground-truth scoring.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::arith::{bits_msb_first, gcd, is_odd, is_probable_prime, lcm, mod_inverse};
use crate::error::{LabError, Result};

/// Miller-Rabin rounds used when validating keys.
const VALIDATION_ROUNDS: usize = 24;

/// Fixed witness seed so validation is a pure function of the key.
const VALIDATION_SEED: u64 = 0x5253_4120_7465_7374;

/// Public half of an RSA key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    /// Modulus.
    pub n: BigUint,
    /// Public exponent.
    pub e: BigUint,
}

impl PublicKey {
    /// Validate and build a public key.
    ///
    /// Range violations (`n = 0`, `e < 3`, `e >= n`) are `Domain` errors.
    /// An even modulus, an even exponent (no inverse modulo the even group
    /// order) or a prime modulus are `InconsistentKey` errors.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        if n.is_zero() {
            return Err(LabError::domain("modulus (n) must be positive"));
        }
        if !is_odd(&n) {
            return Err(LabError::inconsistent_key("modulus (n) must be odd"));
        }
        if e < BigUint::from(3u32) {
            return Err(LabError::domain("public exponent (e) must be at least 3"));
        }
        if !is_odd(&e) {
            return Err(LabError::inconsistent_key(
                "public exponent (e) must be odd to be invertible modulo lambda(n)",
            ));
        }
        if e >= n {
            return Err(LabError::domain(
                "public exponent (e) must be strictly less than modulus (n)",
            ));
        }
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(VALIDATION_SEED);
        if is_probable_prime(&n, VALIDATION_ROUNDS, &mut rng) {
            return Err(LabError::inconsistent_key("modulus (n) must not be prime"));
        }
        Ok(Self { n, e })
    }

    /// Bit length of the modulus.
    pub fn modulus_bits(&self) -> u64 {
        self.n.bits()
    }

    /// Textbook RSA encryption `m^e mod n`.
    pub fn encrypt(&self, m: &BigUint) -> BigUint {
        m.modpow(&self.e, &self.n)
    }

    /// Whether `d` works as a private exponent on `probe`:
    /// `(probe^e)^d == probe (mod n)`.
    pub fn decrypts_with(&self, d: &BigUint, probe: &BigUint) -> bool {
        let probe = probe % &self.n;
        self.encrypt(&probe).modpow(d, &self.n) == probe
    }
}

/// Full RSA key pair, including the secret exponent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    public: PublicKey,
    d: BigUint,
    p: BigUint,
    q: BigUint,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("n", &self.public.n)
            .field("e", &self.public.e)
            .field("exponent_bits", &self.exponent_bits())
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Validate and build a key pair.
    ///
    /// Checks `n = p * q` with distinct primes, `gcd(e, lambda(n)) = 1` and
    /// `d * e = 1 (mod lambda(n))`.
    pub fn new(n: BigUint, e: BigUint, d: BigUint, p: BigUint, q: BigUint) -> Result<Self> {
        let public = PublicKey::new(n, e)?;
        let one = BigUint::one();

        if p <= one {
            return Err(LabError::domain("first prime factor (p) must be greater than 1"));
        }
        if q <= one {
            return Err(LabError::domain("second prime factor (q) must be greater than 1"));
        }
        if p == q {
            return Err(LabError::inconsistent_key("prime factors (p, q) must be different"));
        }
        if &p * &q != public.n {
            return Err(LabError::inconsistent_key(
                "modulus (n) is not equal to the product of prime factors (p, q)",
            ));
        }
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(VALIDATION_SEED);
        if !is_probable_prime(&p, VALIDATION_ROUNDS, &mut rng) {
            return Err(LabError::inconsistent_key("first prime factor (p) is not prime"));
        }
        if !is_probable_prime(&q, VALIDATION_ROUNDS, &mut rng) {
            return Err(LabError::inconsistent_key("second prime factor (q) is not prime"));
        }

        let lambda = carmichael(&p, &q);
        if !gcd(&public.e, &lambda).is_one() {
            return Err(LabError::inconsistent_key("lambda(n) is not coprime to e"));
        }
        if d.is_zero() || (&d * &public.e) % &lambda != one {
            return Err(LabError::inconsistent_key(
                "private exponent (d) is not the inverse of e modulo lambda(n)",
            ));
        }

        Ok(Self { public, d, p, q })
    }

    /// Build from two primes, deriving `d = e^-1 mod lambda(n)`.
    pub fn from_primes(p: BigUint, q: BigUint, e: BigUint) -> Result<Self> {
        let n = &p * &q;
        let lambda = carmichael(&p, &q);
        let d = mod_inverse(&e, &lambda)
            .ok_or_else(|| LabError::inconsistent_key("e has no inverse modulo lambda(n)"))?;
        Self::new(n, e, d, p, q)
    }

    /// Public half.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// Modulus.
    pub fn n(&self) -> &BigUint {
        &self.public.n
    }

    /// Public exponent.
    pub fn e(&self) -> &BigUint {
        &self.public.e
    }

    /// Private exponent (ground truth).
    pub fn d(&self) -> &BigUint {
        &self.d
    }

    /// First prime factor.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Second prime factor.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Bit length `L` of the private exponent.
    pub fn exponent_bits(&self) -> u64 {
        self.d.bits()
    }

    /// Bits of the private exponent, most significant first.
    pub fn private_bits(&self) -> Vec<bool> {
        bits_msb_first(&self.d)
    }

    /// Carmichael function `lambda(n) = lcm(p - 1, q - 1)`.
    pub fn lambda(&self) -> BigUint {
        carmichael(&self.p, &self.q)
    }
}

fn carmichael(p: &BigUint, q: &BigUint) -> BigUint {
    let one = BigUint::one();
    lcm(&(p - &one), &(q - &one))
}
