//! Number-theoretic helpers over `BigUint`.

use num_bigint::{BigInt, BigUint};
use num_integer::{ExtendedGcd, Integer};
use num_traits::{One, Zero};
use rand::RngCore;

/// Greatest common divisor.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// Least common multiple (0 if either argument is 0).
pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    a.lcm(b)
}

/// Inverse of `a` modulo `m`, if it exists.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let m_int = BigInt::from(m.clone());
    let ExtendedGcd { gcd, x, .. } = BigInt::from(a % m).extended_gcd(&m_int);
    if !gcd.is_one() {
        return None;
    }
    x.mod_floor(&m_int).to_biguint()
}

/// Uniform value in `[0, bound)` by rejection sampling. `bound` must be > 0.
pub fn random_below<R: RngCore + ?Sized>(rng: &mut R, bound: &BigUint) -> BigUint {
    debug_assert!(!bound.is_zero());
    let bits = bound.bits();
    let bytes = bits.div_ceil(8) as usize;
    let excess = (bytes as u64 * 8 - bits) as u32;
    let mut buf = vec![0u8; bytes];
    loop {
        rng.fill_bytes(&mut buf);
        if let Some(top) = buf.last_mut() {
            *top &= 0xFFu8 >> excess;
        }
        let candidate = BigUint::from_bytes_le(&buf);
        if &candidate < bound {
            return candidate;
        }
    }
}

const SMALL_PRIMES: [u32; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

/// Miller-Rabin probable-prime test with `rounds` witnesses drawn from `rng`.
///
/// Deterministic for a given RNG state, so seeded key generation is
/// reproducible.
pub fn is_probable_prime<R: RngCore + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for &p in &SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - BigUint::one();
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while (&d % 2u32).is_zero() {
        d >>= 1;
        r += 1;
    }

    // Witnesses in [2, n - 2].
    let span = n - BigUint::from(3u32);
    'witness: for _ in 0..rounds {
        let a = random_below(rng, &span) + &two;
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..r {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn big(x: u64) -> BigUint {
        BigUint::from(x)
    }

    #[test]
    fn test_gcd_and_lcm() {
        assert_eq!(gcd(&big(24), &big(36)), big(12));
        assert_eq!(gcd(&big(17), &big(5)), big(1));
        assert_eq!(lcm(&big(10), &big(12)), big(60));
        assert_eq!(lcm(&big(0), &big(12)), big(0));
    }

    #[test]
    fn test_mod_inverse() {
        // 7 * 103 = 721 = 6 * 120 + 1
        assert_eq!(mod_inverse(&big(7), &big(120)), Some(big(103)));
        assert_eq!(mod_inverse(&big(6), &big(120)), None);
        assert_eq!(mod_inverse(&big(3), &big(0)), None);
        // Arguments above the modulus reduce first: 127 = 7 (mod 120).
        assert_eq!(mod_inverse(&big(127), &big(120)), Some(big(103)));
        assert_eq!(mod_inverse(&big(125), &big(120)), None);
    }

    #[test]
    fn test_inverse_agrees_with_gcd() {
        let m = big(3 * 5 * 7 * 64);
        for a in 1..200u64 {
            let a = big(a);
            match mod_inverse(&a, &m) {
                Some(inv) => assert_eq!((&a * inv) % &m, big(1)),
                None => assert_ne!(gcd(&a, &m), big(1)),
            }
        }
    }

    #[test]
    fn test_primality() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        for p in [2u64, 3, 5, 97, 65537, 1_000_000_007, 4_294_967_291] {
            assert!(is_probable_prime(&big(p), 16, &mut rng), "{} is prime", p);
        }
        for c in [0u64, 1, 4, 91, 561, 65537 * 65539, 1_000_000_007 * 3] {
            assert!(!is_probable_prime(&big(c), 16, &mut rng), "{} is composite", c);
        }
    }

    #[test]
    fn test_random_below_stays_in_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let bound = big(1000);
        for _ in 0..2000 {
            assert!(random_below(&mut rng, &bound) < bound);
        }
        assert_eq!(random_below(&mut rng, &big(1)), big(0));
    }
}
