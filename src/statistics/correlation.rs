//! Linear association between elapsed time and predicted leakage.

use super::moments::PairMoments;

/// Pearson correlation coefficient of `x` and `y`.
///
/// Returns 0.0 when either series has zero variance (for example a
/// noiseless no-leak target, where every elapsed time is identical).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    pearson_from_moments(&PairMoments::from_slices(x, y))
}

/// Pearson correlation from pre-accumulated moments.
pub fn pearson_from_moments(m: &PairMoments) -> f64 {
    let denom = (m.var_x() * m.var_y()).sqrt();
    if denom <= 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (m.cov_xy() / denom).clamp(-1.0, 1.0)
}

/// Variance of `times` left unexplained by an ordinary least-squares fit
/// against `predicted`.
///
/// ```text
/// resid = Var(T) - Cov(T, P)^2 / Var(P)
/// ```
///
/// Only a positive slope counts as explanation: extra reductions can only
/// add time, so a negative association leaves the full variance of `T`
/// unexplained.
pub fn residual_variance(m: &PairMoments) -> f64 {
    let var_t = m.var_x();
    let var_p = m.var_y();
    let cov = m.cov_xy();
    if var_p <= 0.0 || cov <= 0.0 {
        return var_t;
    }
    (var_t - cov * cov / var_p).max(0.0)
}
