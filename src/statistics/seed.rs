//! Deterministic seed derivation.
//!
//! Campaigns never touch process-wide random state: a single top-level seed
//! is expanded into per-key, per-collection and per-target seeds with a
//! counter-based PRF.

/// Derive a child seed from a base seed and a counter using SplitMix64.
///
/// This is a stateless PRF: the same `(base_seed, counter)` pair always maps
/// to the same output, and neighbouring counters give unrelated seeds, so
/// `derive_seed(s, 0)`, `derive_seed(s, 1)`, ... can seed independent
/// streams.
///
/// # Arguments
///
/// * `base_seed` - Parent seed
/// * `counter` - Child index (0, 1, 2, ...)
#[inline]
pub fn derive_seed(base_seed: u64, counter: u64) -> u64 {
    // See: https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_add(1).wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}
