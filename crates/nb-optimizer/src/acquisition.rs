//! Damped Upper Confidence Bound acquisition.

use nb_types::{InputError, NbResult};

use crate::surrogate::Prediction;

/// Weight on the exploration term. Plain UCB over-explores here because the
/// surrogate's uncertainty is itself a distance.
pub const EXPLORATION_WEIGHT: f64 = 0.5;

/// `expected + sqrt(uncertainty) / 2`.
///
/// A zero uncertainty degrades to the expected value alone. Negative (or NaN)
/// uncertainty is rejected.
pub fn upper_confidence_bound(expected: f64, uncertainty: f64) -> NbResult<f64> {
    if uncertainty < 0.0 || uncertainty.is_nan() {
        return Err(InputError::NegativeUncertainty { uncertainty }.into());
    }
    Ok(expected + uncertainty.sqrt() * EXPLORATION_WEIGHT)
}

impl Prediction {
    /// Acquisition score of this estimate.
    pub fn score(&self) -> NbResult<f64> {
        upper_confidence_bound(self.expected, self.uncertainty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_types::NbError;

    #[test]
    fn zero_uncertainty_is_pure_exploitation() {
        assert_eq!(upper_confidence_bound(1.25, 0.0).unwrap(), 1.25);
        assert_eq!(upper_confidence_bound(-3.0, 0.0).unwrap(), -3.0);
    }

    #[test]
    fn damped_exploration_term() {
        let score = upper_confidence_bound(1.0, 4.0).unwrap();
        assert!((score - 2.0).abs() < 1e-12);

        let p = Prediction {
            expected: -0.5,
            uncertainty: 0.25,
        };
        assert!((p.score().unwrap() - -0.25).abs() < 1e-12);
    }

    #[test]
    fn strictly_increasing_in_uncertainty() {
        let uncertainties = [0.0, 1e-6, 0.01, 0.3, 1.0, 2.5, 100.0];
        for pair in uncertainties.windows(2) {
            let lo = upper_confidence_bound(0.7, pair[0]).unwrap();
            let hi = upper_confidence_bound(0.7, pair[1]).unwrap();
            assert!(hi > lo, "{} -> {lo}, {} -> {hi}", pair[0], pair[1]);
        }
    }

    #[test]
    fn strictly_increasing_in_expected_value() {
        let expected = [-5.0, -1.0, -0.001, 0.0, 0.5, 3.0];
        for pair in expected.windows(2) {
            let lo = upper_confidence_bound(pair[0], 0.4).unwrap();
            let hi = upper_confidence_bound(pair[1], 0.4).unwrap();
            assert!(hi > lo);
        }
    }

    #[test]
    fn negative_uncertainty_rejected() {
        let err = upper_confidence_bound(0.0, -1e-9).unwrap_err();
        assert!(matches!(
            err,
            NbError::InvalidInput(InputError::NegativeUncertainty { .. })
        ));
        assert!(upper_confidence_bound(0.0, f64::NAN).is_err());
    }
}
