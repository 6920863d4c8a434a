use ndarray::Array1;

use crate::config::SPAN;
use crate::data::SamplePair;
use crate::math::max_abs;

/// Express `value` as a percentage of the instrument span
pub fn percent_of_span(value: f64) -> f64 {
    value / SPAN * 100.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityMetrics {
    /// Largest absolute deviation of a measured reading from the fitted line, in mm
    pub linearity: f64,
    pub linearity_percent: f64,
    /// Largest absolute deviation of a measured reading from the reference standard, in mm
    pub max_error: f64,
    /// `max_error` as a percentage of [`SPAN`]
    pub fiducial_error: f64,
}

impl QualityMetrics {
    pub fn new(pair: &SamplePair, residuals: &Array1<f64>) -> Self {
        let linearity = max_abs(residuals);
        let max_error = max_abs(&(pair.measured() - pair.reference()));
        Self {
            linearity,
            linearity_percent: percent_of_span(linearity),
            max_error,
            fiducial_error: percent_of_span(max_error),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::arr1;

    use super::{percent_of_span, QualityMetrics};
    use crate::{data::SamplePair, fit::LinearFit, uncertainty::residuals, Result};

    #[test]
    fn percentages_are_relative_to_a_500_mm_span() {
        approx::assert_relative_eq!(percent_of_span(5.0), 1.0);
        approx::assert_relative_eq!(percent_of_span(500.0), 100.0);
    }

    #[test]
    fn lit101_metrics_match_recomputed_reference_values() -> Result<()> {
        let pair = SamplePair::lit101();
        let fit = LinearFit::fit(&pair)?;
        let metrics = QualityMetrics::new(&pair, &residuals(&pair, &fit));

        approx::assert_abs_diff_eq!(metrics.linearity, 2.319_811_180_272_21, epsilon = 1e-6);
        approx::assert_relative_eq!(metrics.linearity_percent, 100.0 * metrics.linearity / 500.0);
        // 485.0 read as 480.5
        approx::assert_abs_diff_eq!(metrics.max_error, 4.5, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(metrics.fiducial_error, 0.9, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn metrics_are_non_negative_when_readings_fall_below_the_reference() -> Result<()> {
        let pair = SamplePair::new(arr1(&[100., 200., 300.]), arr1(&[90., 185., 290.]))?;
        let fit = LinearFit::fit(&pair)?;
        let metrics = QualityMetrics::new(&pair, &residuals(&pair, &fit));

        assert!(metrics.linearity >= 0.0);
        assert!(metrics.linearity_percent >= 0.0);
        approx::assert_relative_eq!(metrics.max_error, 15.0);
        approx::assert_relative_eq!(metrics.fiducial_error, 3.0);
        Ok(())
    }
}
