//! Statistical building blocks for the attack engine and diagnostics.
//!
//! - Sample moments with deterministic summation order
//! - Pearson correlation and least-squares residual variance
//! - Lag-1 autocorrelation for dataset sanity checks
//! - Counter-based seed derivation

mod autocorrelation;
mod correlation;
mod moments;
mod seed;

pub use autocorrelation::lag1_autocorrelation;
pub use correlation::{pearson, pearson_from_moments, residual_variance};
pub use moments::{mean, variance, PairMoments};
pub use seed::derive_seed;
