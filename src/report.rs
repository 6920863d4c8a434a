use std::fmt;

use crate::calibration::Calibration;
use crate::config::CONFIDENCE;

const RULE: &str = "------------------------------";

/// Text summary of a [`Calibration`], as entered in a calibration report.
pub struct Report<'a>(pub &'a Calibration);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fit = self.0.fit();
        let uncertainty = self.0.uncertainty();
        let metrics = self.0.metrics();

        writeln!(f, "{RULE}")?;
        writeln!(f, "CALIBRATION RESULTS")?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Line equation: y = {:.4} * x + {:.4}",
            fit.slope, fit.intercept
        )?;
        writeln!(
            f,
            "Coefficient of determination (R²): {:.5}",
            fit.r_squared()
        )?;
        writeln!(
            f,
            "Residual standard deviation (Sy): {:.4} mm",
            uncertainty.residual_standard_deviation
        )?;
        writeln!(f, "Degrees of freedom (v): {}", uncertainty.degrees_of_freedom)?;
        writeln!(
            f,
            "t-Student factor ({:.2}%): {:.4}",
            CONFIDENCE * 100.0,
            uncertainty.coverage_factor
        )?;
        writeln!(f, "Standard uncertainty (u): {:.4} mm", uncertainty.standard)?;
        writeln!(f, "Expanded uncertainty (U): {:.4} mm", uncertainty.expanded)?;
        writeln!(
            f,
            "Linearity: {:.4} mm ({:.2}%)",
            metrics.linearity, metrics.linearity_percent
        )?;
        writeln!(
            f,
            "Maximum fiducial error: {:.2}% (max error: {:.2} mm)",
            metrics.fiducial_error, metrics.max_error
        )?;
        writeln!(f, "{RULE}")
    }
}
