//! Common data-model types.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// One timed call to a target, preserving collection order in its dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSample {
    /// Input handed to the target (`0 <= input < n`).
    pub input: BigUint,
    /// Simulated elapsed time in nanoseconds, never negative.
    pub time_ns: f64,
}

impl TimingSample {
    /// Create a sample. Negative or non-finite times are clamped to 0.
    pub fn new(input: BigUint, time_ns: f64) -> Self {
        let time_ns = if time_ns.is_finite() { time_ns.max(0.0) } else { 0.0 };
        Self { input, time_ns }
    }
}

/// Output of one timed RSA operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedOutput {
    /// `input^exponent mod n`.
    pub output: BigUint,
    /// Simulated elapsed time in nanoseconds.
    pub time_ns: f64,
}

impl TimedOutput {
    /// Create an output. Negative or non-finite times are clamped to 0.
    pub fn new(output: BigUint, time_ns: f64) -> Self {
        let time_ns = if time_ns.is_finite() { time_ns.max(0.0) } else { 0.0 };
        Self { output, time_ns }
    }
}

/// Nanoseconds per microsecond, for building profiles from µs figures.
pub const NS_PER_US: f64 = 1_000.0;
