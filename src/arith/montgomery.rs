//! Montgomery multiplication with an observable final subtraction.
//!
//! For an odd modulus `n` with `k = bits(n)` and radix `R = 2^k`, the
//! product of two residues in Montgomery form is
//!
//! ```text
//! t = a * b
//! m = (t mod R) * n' mod R        where n * n' = -1 (mod R)
//! u = (t + m * n) / R
//! if u >= n { u -= n }            <- the extra reduction
//! ```
//!
//! Whether the last line runs depends only on `a`, `b` and `n`. That branch
//! is the timing side channel: the target pays for it, and the attacker
//! predicts it by calling the very same [`Montgomery::mul`].

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::numtheory::mod_inverse;
use crate::error::{LabError, Result};

/// Result of one Montgomery product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MontProduct {
    /// Reduced product in Montgomery form, always `< n`.
    pub value: BigUint,
    /// Whether the conditional final subtraction ran.
    pub extra_reduction: bool,
}

/// Precomputed Montgomery context for one modulus.
#[derive(Debug, Clone)]
pub struct Montgomery {
    modulus: BigUint,
    k: u64,
    mask: BigUint,
    n_prime: BigUint,
    one: BigUint,
}

impl Montgomery {
    /// Build a context for `modulus`.
    ///
    /// Fails with `InconsistentKey` for an even modulus or one below 3: the
    /// radix inverse does not exist there.
    pub fn new(modulus: &BigUint) -> Result<Self> {
        if modulus < &BigUint::from(3u32) {
            return Err(LabError::inconsistent_key(
                "Montgomery arithmetic requires a modulus of at least 3",
            ));
        }
        if !is_odd(modulus) {
            return Err(LabError::inconsistent_key(
                "Montgomery arithmetic requires an odd modulus",
            ));
        }

        let k = modulus.bits();
        let r = BigUint::one() << k;
        let mask = &r - BigUint::one();
        let n_inv = mod_inverse(modulus, &r)
            .ok_or_else(|| LabError::inconsistent_key("modulus is not invertible mod R"))?;
        let n_prime = &r - n_inv;
        let one = &r % modulus;

        Ok(Self {
            modulus: modulus.clone(),
            k,
            mask,
            n_prime,
            one,
        })
    }

    /// The modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Radix exponent `k` (so `R = 2^k`).
    pub fn radix_bits(&self) -> u64 {
        self.k
    }

    /// Montgomery representation of 1, i.e. `R mod n`.
    pub fn one(&self) -> &BigUint {
        &self.one
    }

    /// Convert `x < n` into Montgomery form (`x * R mod n`).
    pub fn to_mont(&self, x: &BigUint) -> BigUint {
        (x << self.k) % &self.modulus
    }

    /// Convert out of Montgomery form. The final subtraction here is not a
    /// ladder step and is not reported.
    pub fn from_mont(&self, x: &BigUint) -> BigUint {
        self.reduce(x).value
    }

    /// Montgomery product of two residues in Montgomery form.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> MontProduct {
        self.reduce(&(a * b))
    }

    /// Montgomery square.
    pub fn square(&self, a: &BigUint) -> MontProduct {
        self.reduce(&(a * a))
    }

    /// Whether `mul(a, b)` would take the extra reduction, without keeping
    /// the product.
    pub fn would_reduce(&self, a: &BigUint, b: &BigUint) -> bool {
        self.mul(a, b).extra_reduction
    }

    fn reduce(&self, t: &BigUint) -> MontProduct {
        let m = ((t & &self.mask) * &self.n_prime) & &self.mask;
        let u = (t + m * &self.modulus) >> self.k;
        if u >= self.modulus {
            MontProduct {
                value: u - &self.modulus,
                extra_reduction: true,
            }
        } else {
            MontProduct {
                value: u,
                extra_reduction: false,
            }
        }
    }
}

pub(crate) fn is_odd(x: &BigUint) -> bool {
    !(x % 2u32).is_zero()
}
