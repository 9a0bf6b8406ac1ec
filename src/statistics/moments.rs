//! Sample moments with fixed summation order.
//!
//! All reductions here are sequential left-to-right sums so that the same
//! input slice always produces bit-identical output, regardless of how the
//! caller computed the slice.

/// Arithmetic mean, or 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance (divides by n), or 0.0 for fewer than two values.
pub fn variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / data.len() as f64
}

/// Running first and second moments of a pair of series `(x, y)`.
///
/// Accumulates in a single pass with Welford-style updates, which keeps the
/// centred sums stable when `x` carries a large constant offset (the base
/// cost of every exponentiation).
#[derive(Debug, Clone, Copy, Default)]
pub struct PairMoments {
    n: usize,
    mean_x: f64,
    mean_y: f64,
    m2_x: f64,
    m2_y: f64,
    c_xy: f64,
}

impl PairMoments {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `(x, y)` observation.
    pub fn push(&mut self, x: f64, y: f64) {
        self.n += 1;
        let n = self.n as f64;
        let dx = x - self.mean_x;
        self.mean_x += dx / n;
        let dy = y - self.mean_y;
        self.mean_y += dy / n;
        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.c_xy += dx * (y - self.mean_y);
    }

    /// Build from two equally long slices.
    pub fn from_slices(x: &[f64], y: &[f64]) -> Self {
        let mut acc = Self::new();
        for (&a, &b) in x.iter().zip(y) {
            acc.push(a, b);
        }
        acc
    }

    /// Observation count.
    pub fn count(&self) -> usize {
        self.n
    }

    /// Mean of `x`.
    pub fn mean_x(&self) -> f64 {
        self.mean_x
    }

    /// Mean of `y`.
    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }

    /// Population variance of `x`.
    pub fn var_x(&self) -> f64 {
        if self.n < 2 {
            0.0
        } else {
            self.m2_x / self.n as f64
        }
    }

    /// Population variance of `y`.
    pub fn var_y(&self) -> f64 {
        if self.n < 2 {
            0.0
        } else {
            self.m2_y / self.n as f64
        }
    }

    /// Population covariance of `x` and `y`.
    pub fn cov_xy(&self) -> f64 {
        if self.n < 2 {
            0.0
        } else {
            self.c_xy / self.n as f64
        }
    }
}
