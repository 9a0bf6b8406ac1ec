//! Per-bit statistics over the predicted leakage.
//!
//! Both guesses share the cost of every extra reduction already pinned down
//! by the decided bits. That cost is fitted and removed first, so the two
//! guesses are compared only on the events that tell them apart.

use super::predict::Prediction;
use crate::config::Distinguisher;
use crate::statistics::{residual_variance, PairMoments};

/// Elapsed times minus the fitted cost of the settled extra reductions.
///
/// The per-event cost is the least-squares slope of time on the settled
/// event count; a non-positive slope removes nothing. The intercept is left
/// in, since neither statistic depends on it.
pub(crate) fn remove_settled_cost(times: &[f64], predictions: &[Prediction]) -> Vec<f64> {
    let mut moments = PairMoments::new();
    for (&t, p) in times.iter().zip(predictions) {
        moments.push(t, p.settled_events());
    }
    let var_settled = moments.var_y();
    let cov = moments.cov_xy();
    let slope = if var_settled > 0.0 && cov > 0.0 {
        cov / var_settled
    } else {
        0.0
    };
    times
        .iter()
        .zip(predictions)
        .map(|(&t, p)| t - slope * p.settled_events())
        .collect()
}

/// Score `guess` over the settled residuals. Sums run sequentially in
/// sample order.
pub(crate) fn score(
    distinguisher: Distinguisher,
    residuals: &[f64],
    predictions: &[Prediction],
    guess: usize,
) -> f64 {
    match distinguisher {
        Distinguisher::ResidualVariance => {
            let mut moments = PairMoments::new();
            for (&r, p) in residuals.iter().zip(predictions) {
                moments.push(r, p.guess_events(guess));
            }
            residual_variance(&moments)
        }
        Distinguisher::MeanDifference => {
            let (mut sum_set, mut n_set) = (0.0, 0usize);
            let (mut sum_clear, mut n_clear) = (0.0, 0usize);
            for (&t, p) in residuals.iter().zip(predictions) {
                if p.flag(guess) {
                    sum_set += t;
                    n_set += 1;
                } else {
                    sum_clear += t;
                    n_clear += 1;
                }
            }
            if n_set == 0 || n_clear == 0 {
                return 0.0;
            }
            (sum_set / n_set as f64 - sum_clear / n_clear as f64).abs()
        }
    }
}

/// Pick a guess from the two scores and report the normalized gap.
///
/// Ties go to 0. Confidence is 0 when both scores are 0.
pub(crate) fn decide(distinguisher: Distinguisher, s0: f64, s1: f64) -> (usize, f64) {
    let guess = if distinguisher.larger_wins() {
        usize::from(s1 > s0)
    } else {
        usize::from(s1 < s0)
    };
    let total = s0 + s1;
    let confidence = if total > 0.0 && total.is_finite() {
        ((s0 - s1).abs() / total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (guess, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::{ExponentiationShape, Montgomery};
    use crate::attack::predict::PredictionModel;
    use crate::statistics::variance;
    use num_bigint::BigUint;

    fn predictions() -> Vec<Prediction> {
        let ctx = Montgomery::new(&BigUint::from(3233u32)).unwrap();
        let model = PredictionModel::new(ctx, ExponentiationShape::SquareAndMultiply);
        (2u32..3000)
            .step_by(7)
            .map(|m| model.predict(&model.init(&BigUint::from(m), 11), 10))
            .collect()
    }

    #[test]
    fn test_settled_cost_is_removed() {
        let predictions = predictions();
        let times: Vec<f64> = predictions
            .iter()
            .map(|p| 7_000.0 + 40_000.0 * p.settled_events())
            .collect();
        assert!(variance(&times) > 0.0);
        let residuals = remove_settled_cost(&times, &predictions);
        assert!(variance(&residuals) < 1e-6);
    }

    #[test]
    fn test_guess_events_pick_the_true_bit() {
        let predictions = predictions();
        for truth in 0..2 {
            let times: Vec<f64> = predictions
                .iter()
                .map(|p| 1_000.0 + 50.0 * (p.settled_events() + p.guess_events(truth)))
                .collect();
            let residuals = remove_settled_cost(&times, &predictions);
            let s0 = score(Distinguisher::ResidualVariance, &residuals, &predictions, 0);
            let s1 = score(Distinguisher::ResidualVariance, &residuals, &predictions, 1);
            let (guess, confidence) = decide(Distinguisher::ResidualVariance, s0, s1);
            assert_eq!(guess, truth);
            assert!(confidence > 0.0);
        }
    }

    #[test]
    fn test_decide_direction() {
        assert_eq!(decide(Distinguisher::ResidualVariance, 2.0, 1.0).0, 1);
        assert_eq!(decide(Distinguisher::ResidualVariance, 1.0, 2.0).0, 0);
        assert_eq!(decide(Distinguisher::MeanDifference, 1.0, 2.0).0, 1);
        assert_eq!(decide(Distinguisher::MeanDifference, 2.0, 1.0).0, 0);
    }

    #[test]
    fn test_confidence_gap() {
        let (_, c) = decide(Distinguisher::ResidualVariance, 3.0, 1.0);
        assert!((c - 0.5).abs() < 1e-12);
        assert_eq!(decide(Distinguisher::ResidualVariance, 0.0, 0.0), (0, 0.0));
        assert_eq!(decide(Distinguisher::MeanDifference, 4.0, 4.0), (0, 0.0));
    }
}
