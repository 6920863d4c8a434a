#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

// Links the OpenBLAS backend used by `ndarray` and `ndarray-linalg`.
extern crate blas_src;

use std::path::PathBuf;

pub mod calibration;
pub mod config;
pub mod data;
pub mod fit;
pub mod math;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod uncertainty;

pub use calibration::Calibration;
pub use config::{Config, CONFIDENCE, SPAN};
pub use data::SamplePair;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reference has {reference} values but measured has {measured}")]
    LengthMismatch { reference: usize, measured: usize },
    #[error("at least 3 sample pairs are needed for a linear fit, got {0}")]
    TooFewPoints(usize),
    #[error("sample pair {index} contains a non-finite value")]
    NonFinite { index: usize },
    #[error("reference values have zero variance, the slope is undefined")]
    ZeroVariance,
    #[error("fitted slope is zero, the standard uncertainty cannot be referred to the input")]
    ZeroSlope,
    #[error("confidence level {0} must lie strictly between 0 and 1")]
    InvalidConfidence(f64),
    #[error("least squares solve failed: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),
    #[error("invalid t-distribution: {0}")]
    Distribution(#[from] statrs::StatsError),
    #[error("failed to render plot to {path:?}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to read sample pairs: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = ::std::result::Result<T, Error>;
