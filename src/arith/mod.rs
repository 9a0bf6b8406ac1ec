//! Exact big-integer exponentiation simulator.
//!
//! - [`Montgomery`]: Montgomery products that report the extra reduction
//! - [`ExponentiationShape`]: per-bit step order shared by target and attacker
//! - Number theory: gcd, lcm, modular inverse, Miller-Rabin, uniform sampling

mod montgomery;
mod numtheory;
mod shape;

pub use montgomery::{MontProduct, Montgomery};
pub use numtheory::{gcd, is_probable_prime, lcm, mod_inverse, random_below};
pub use shape::{modpow_traced, ExponentiationShape, LadderTrace, StepOutcome};

pub(crate) use montgomery::is_odd;

use num_bigint::BigUint;

/// Bits of `x`, most significant first. Empty for zero.
pub fn bits_msb_first(x: &BigUint) -> Vec<bool> {
    let len = x.bits() as usize;
    let bytes = x.to_bytes_le();
    (0..len)
        .rev()
        .map(|i| (bytes[i / 8] >> (i % 8)) & 1 == 1)
        .collect()
}

/// Inverse of [`bits_msb_first`].
pub fn from_bits_msb_first(bits: &[bool]) -> BigUint {
    let mut bytes = vec![0u8; bits.len().div_ceil(8).max(1)];
    let len = bits.len();
    for (idx, &bit) in bits.iter().enumerate() {
        if bit {
            let i = len - 1 - idx;
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    BigUint::from_bytes_le(&bytes)
}
