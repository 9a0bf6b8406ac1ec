//! Autocorrelation of a timing series in collection order.
//!
//! Simulated samples are drawn independently, so the lag-1 autocorrelation
//! of a dataset's elapsed times should sit near zero. A large value means the
//! noise stream or the input stream is being reused across samples.

/// Compute lag-1 autocorrelation of a time series.
///
/// Returns the coefficient in [-1, 1], or 0.0 if the data has fewer than 2
/// elements or zero variance.
///
/// # Formula
///
/// ```text
/// r_1 = sum((x_t - mean) * (x_{t+1} - mean)) / sum((x_t - mean)^2)
/// ```
pub fn lag1_autocorrelation(data: &[f64]) -> f64 {
    compute_lag_autocorrelation(data, 1)
}

fn compute_lag_autocorrelation(data: &[f64], lag: usize) -> f64 {
    let n = data.len();
    if n <= lag {
        return 0.0;
    }

    let mean: f64 = data.iter().sum::<f64>() / n as f64;
    let variance: f64 = data.iter().map(|&x| (x - mean).powi(2)).sum();
    if variance == 0.0 {
        return 0.0;
    }

    let mut lagged_cov = 0.0;
    for t in 0..(n - lag) {
        lagged_cov += (data[t] - mean) * (data[t + lag] - mean);
    }

    lagged_cov / variance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_series_is_anticorrelated() {
        let data: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(lag1_autocorrelation(&data) < -0.9);
    }

    #[test]
    fn test_short_or_flat_series() {
        assert_eq!(lag1_autocorrelation(&[1.0]), 0.0);
        assert_eq!(lag1_autocorrelation(&[2.0; 50]), 0.0);
    }

    #[test]
    fn test_slow_drift_is_positive() {
        let data: Vec<f64> = (0..200).map(|i| i as f64).collect();
        assert!(lag1_autocorrelation(&data) > 0.9);
    }
}
