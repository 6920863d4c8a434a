use ndarray::Array1;
use tracing::debug;

use crate::data::SamplePair;
use crate::math::{centred_cross_sum, is_constant, least_squares};
use crate::{Error, Result};

/// Ordinary least-squares line `y = slope * x + intercept` through a [`SamplePair`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient between reference and measured values
    pub correlation: f64,
}

impl LinearFit {
    /// Fit the measured readings against the reference readings
    ///
    /// The coefficients minimise the squared vertical distance of the measured readings from the
    /// line.
    ///
    /// # Errors
    /// Returns [`Error::ZeroVariance`] if every reference reading is identical, or a LAPACK error
    /// if the least-squares solve fails.
    pub fn fit(pair: &SamplePair) -> Result<Self> {
        let x = pair.reference();
        let y = pair.measured();

        if is_constant(x) {
            return Err(Error::ZeroVariance);
        }

        // A constant measured series is fitted exactly by a flat line and has no defined
        // correlation, it is reported as uncorrelated
        if is_constant(y) {
            return Ok(Self {
                slope: 0.0,
                intercept: y[0],
                correlation: 0.0,
            });
        }

        let coeffs = least_squares(x, y)?;
        let (intercept, slope) = (coeffs[0], coeffs[1]);
        let sxx = centred_cross_sum(x, x);
        let syy = centred_cross_sum(y, y);
        let correlation = centred_cross_sum(x, y) / (sxx * syy).sqrt();

        debug!(slope, intercept, correlation, "fitted calibration line");
        Ok(Self {
            slope,
            intercept,
            correlation,
        })
    }

    /// Coefficient of determination, the square of the correlation coefficient
    pub fn r_squared(&self) -> f64 {
        self.correlation.powi(2)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }

    pub fn predict_all(&self, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|xi| self.predict(xi))
    }
}
