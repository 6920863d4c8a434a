use ndarray::Array1;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use crate::config::CONFIDENCE;
use crate::data::SamplePair;
use crate::fit::LinearFit;
use crate::{Error, Result};

/// Deviation of each measured reading from the fitted line, `y_i - (a x_i + b)`
pub fn residuals(pair: &SamplePair, fit: &LinearFit) -> Array1<f64> {
    pair.measured() - &fit.predict_all(pair.reference())
}

/// Two-sided coverage factor of the Student t-distribution
///
/// This is the quantile $t_{1 - \alpha / 2, \nu}$ with $\alpha = 1 - p$, so that an interval of
/// $\pm t$ standard uncertainties covers a fraction `confidence` of the distribution.
///
/// # Errors
/// Returns an error if `confidence` is not strictly between zero and one, or if there are no
/// degrees of freedom.
pub fn coverage_factor(degrees_of_freedom: usize, confidence: f64) -> Result<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(Error::InvalidConfidence(confidence));
    }
    let alpha = 1.0 - confidence;
    let distribution = StudentsT::new(0.0, 1.0, degrees_of_freedom as f64)?;
    Ok(distribution.inverse_cdf(1.0 - alpha / 2.0))
}

/// Uncertainty of the corrected indication, referred to the input of the instrument.
///
/// Only the scatter about the fitted line is considered, the uncertainty of the fitted
/// parameters and of the reference standard itself is neglected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uncertainty {
    /// `n - 2`, two parameters are estimated by the fit
    pub degrees_of_freedom: usize,
    /// Standard deviation of the residuals, Sy
    pub residual_standard_deviation: f64,
    /// Standard uncertainty u = Sy / a
    pub standard: f64,
    /// Student t coverage factor at [`CONFIDENCE`]
    pub coverage_factor: f64,
    /// Expanded uncertainty U = t u
    pub expanded: f64,
}

impl Uncertainty {
    /// Derive the uncertainty of the corrected indication from the residuals about `fit`
    ///
    /// # Errors
    /// Returns [`Error::ZeroSlope`] if the fitted line is flat, in which case the
    /// uncertainty cannot be referred to the reference axis.
    #[allow(clippy::float_cmp)]
    pub fn from_residuals(residuals: &Array1<f64>, fit: &LinearFit) -> Result<Self> {
        if fit.slope == 0.0 {
            return Err(Error::ZeroSlope);
        }
        let degrees_of_freedom = residuals.len().saturating_sub(2);
        if degrees_of_freedom == 0 {
            return Err(Error::TooFewPoints(residuals.len()));
        }

        let sum_of_squares = residuals.dot(residuals);
        let residual_standard_deviation = (sum_of_squares / degrees_of_freedom as f64).sqrt();
        let standard = residual_standard_deviation / fit.slope;
        let coverage_factor = coverage_factor(degrees_of_freedom, CONFIDENCE)?;
        let expanded = coverage_factor * standard;

        debug!(
            degrees_of_freedom,
            residual_standard_deviation, standard, coverage_factor, expanded, "computed uncertainty"
        );
        Ok(Self {
            degrees_of_freedom,
            residual_standard_deviation,
            standard,
            coverage_factor,
            expanded,
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::arr1;

    use super::{coverage_factor, residuals, Uncertainty};
    use crate::{config::CONFIDENCE, data::SamplePair, fit::LinearFit, Error, Result};

    #[test]
    fn coverage_factor_matches_exact_quantiles() -> Result<()> {
        // t_{0.97725, v} computed from the regularised incomplete beta function
        let table = [
            (1, 13.967_811_487_502_5),
            (2, 4.526_550_760_081_99),
            (5, 2.648_654_254_283_12),
            (8, 2.366_419_499_743_07),
            (30, 2.086_847_053_536_65),
        ];
        for (degrees_of_freedom, expected) in table {
            let calculated = coverage_factor(degrees_of_freedom, CONFIDENCE)?;
            approx::assert_relative_eq!(calculated, expected, max_relative = 1e-4);
        }
        Ok(())
    }

    #[test]
    fn coverage_factor_approaches_two_sigma() -> Result<()> {
        let t = coverage_factor(1_000, CONFIDENCE)?;
        approx::assert_abs_diff_eq!(t, 2.0, epsilon = 5e-3);
        Ok(())
    }

    #[test]
    fn confidence_outside_unit_interval_is_rejected() {
        assert!(matches!(
            coverage_factor(8, 1.0),
            Err(Error::InvalidConfidence(_))
        ));
        assert!(matches!(
            coverage_factor(8, -0.5),
            Err(Error::InvalidConfidence(_))
        ));
    }

    #[test]
    fn residual_variance_reproduces_sum_of_squares() -> Result<()> {
        let pair = SamplePair::lit101();
        let fit = LinearFit::fit(&pair)?;
        let residuals = residuals(&pair, &fit);
        let uncertainty = Uncertainty::from_residuals(&residuals, &fit)?;

        let sum_of_squares: f64 = residuals.iter().map(|r| r * r).sum();
        approx::assert_relative_eq!(
            uncertainty.residual_standard_deviation.powi(2)
                * uncertainty.degrees_of_freedom as f64,
            sum_of_squares,
            max_relative = 1e-12
        );
        Ok(())
    }

    #[test]
    fn lit101_uncertainty_matches_recomputed_reference_values() -> Result<()> {
        let pair = SamplePair::lit101();
        let fit = LinearFit::fit(&pair)?;
        let uncertainty = Uncertainty::from_residuals(&residuals(&pair, &fit), &fit)?;

        assert_eq!(uncertainty.degrees_of_freedom, 8);
        approx::assert_abs_diff_eq!(
            uncertainty.residual_standard_deviation,
            1.209_301_690_509_82,
            epsilon = 1e-6
        );
        approx::assert_abs_diff_eq!(uncertainty.standard, 1.226_132_390_657_36, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(uncertainty.coverage_factor, 2.366_4, epsilon = 1e-3);
        approx::assert_relative_eq!(
            uncertainty.expanded,
            uncertainty.coverage_factor * uncertainty.residual_standard_deviation / fit.slope,
            max_relative = 1e-12
        );
        Ok(())
    }

    #[test]
    fn residuals_of_least_squares_fit_sum_to_zero() -> Result<()> {
        let pair = SamplePair::lit101();
        let fit = LinearFit::fit(&pair)?;
        approx::assert_abs_diff_eq!(residuals(&pair, &fit).sum(), 0.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn small_but_non_zero_slope_is_accepted() -> Result<()> {
        // Readings in metres against a reference in micrometres give a slope far below EPSILON
        let pair = SamplePair::new(
            arr1(&[0., 1e6, 2e6, 3e6]),
            arr1(&[0.0, 1.01e-16, 1.98e-16, 3.02e-16]),
        )?;
        let fit = LinearFit::fit(&pair)?;
        assert!(fit.slope.abs() < f64::EPSILON);
        let uncertainty = Uncertainty::from_residuals(&residuals(&pair, &fit), &fit)?;
        assert!(uncertainty.standard.is_finite());
        Ok(())
    }

    #[test]
    fn flat_non_integer_fit_has_no_standard_uncertainty() -> Result<()> {
        let pair = SamplePair::new(arr1(&[1., 2., 3.]), arr1(&[0.1; 3]))?;
        let fit = LinearFit::fit(&pair)?;
        let result = Uncertainty::from_residuals(&residuals(&pair, &fit), &fit);
        assert!(matches!(result, Err(Error::ZeroSlope)));
        Ok(())
    }

    #[test]
    fn flat_fit_has_no_standard_uncertainty() -> Result<()> {
        let pair = SamplePair::new(arr1(&[1., 2., 3., 4.]), arr1(&[7., 7., 7., 7.]))?;
        let fit = LinearFit::fit(&pair)?;
        let result = Uncertainty::from_residuals(&residuals(&pair, &fit), &fit);
        assert!(matches!(result, Err(Error::ZeroSlope)));
        Ok(())
    }
}
