use std::io::Write;
use std::path::Path;

use ndarray::Array1;
use tracing::info;

use crate::config::Config;
use crate::data::SamplePair;
use crate::fit::LinearFit;
use crate::metrics::QualityMetrics;
use crate::uncertainty::{residuals, Uncertainty};
use crate::report::Report;
use crate::{plot, Result};

/// Everything derived from one [`SamplePair`], computed once in a fixed order
#[derive(Clone, Debug, PartialEq)]
pub struct Calibration {
    pair: SamplePair,
    fit: LinearFit,
    residuals: Array1<f64>,
    uncertainty: Uncertainty,
    metrics: QualityMetrics,
}

impl Calibration {
    /// Fit the calibration line and derive its uncertainty and quality metrics
    ///
    /// # Errors
    /// Returns an error if the reference readings have zero variance or the fitted slope is zero.
    pub fn analyse(pair: SamplePair) -> Result<Self> {
        info!(points = pair.len(), "analysing calibration");
        let fit = LinearFit::fit(&pair)?;
        let residuals = residuals(&pair, &fit);
        let uncertainty = Uncertainty::from_residuals(&residuals, &fit)?;
        let metrics = QualityMetrics::new(&pair, &residuals);

        Ok(Self {
            pair,
            fit,
            residuals,
            uncertainty,
            metrics,
        })
    }

    pub const fn pair(&self) -> &SamplePair {
        &self.pair
    }

    pub const fn fit(&self) -> &LinearFit {
        &self.fit
    }

    pub const fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    pub const fn uncertainty(&self) -> &Uncertainty {
        &self.uncertainty
    }

    pub const fn metrics(&self) -> &QualityMetrics {
        &self.metrics
    }

    /// Fitted line evaluated at each reference reading
    pub fn predicted(&self) -> Array1<f64> {
        self.fit.predict_all(self.pair.reference())
    }

    /// `predicted - U` at each reference reading
    pub fn lower_bound(&self) -> Array1<f64> {
        self.predicted() - self.uncertainty.expanded
    }

    /// `predicted + U` at each reference reading
    pub fn upper_bound(&self) -> Array1<f64> {
        self.predicted() + self.uncertainty.expanded
    }
}

/// Run a complete calibration as described by `config`
///
/// The sample pair is analysed and the calibration curve rendered to `config.output`.
///
/// # Errors
/// Returns an error if the data cannot be loaded, the analysis is undefined for the data, or the
/// plot cannot be written.
pub fn run(config: &Config) -> Result<Calibration> {
    let pair = config.sample_pair()?;
    let calibration = Calibration::analyse(pair)?;
    render(&calibration, config)?;
    Ok(calibration)
}

/// Run a calibration and write the save notice and summary report to `out`
///
/// Nothing is written to `out` unless the run succeeds.
///
/// # Errors
/// Returns an error if the run fails or `out` cannot be written.
pub fn execute<W: Write>(config: &Config, out: &mut W) -> Result<Calibration> {
    let calibration = run(config)?;
    writeln!(out, "Plot saved as '{}'", config.output.display())?;
    write!(out, "{}", Report(&calibration))?;
    out.flush()?;
    Ok(calibration)
}

fn render(calibration: &Calibration, config: &Config) -> Result<()> {
    let output: &Path = &config.output;
    plot::render(calibration, output, (config.width, config.height))?;
    info!(path = %output.display(), "saved calibration curve");
    Ok(())
}
