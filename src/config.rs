use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::SamplePair;
use crate::Result;

/// Full-scale range of the LIT-101 transmitter in millimetres (0 to 500 mm).
pub const SPAN: f64 = 500.0;

/// Confidence level of the expanded uncertainty, two-sigma equivalent.
pub const CONFIDENCE: f64 = 0.9545;

/// Default location of the rendered calibration curve.
pub const DEFAULT_OUTPUT: &str = "calibration_lit101.png";

/// Config file looked up in the working directory when none is named explicitly.
pub const DEFAULT_CONFIG: &str = "calibration.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CALIBRATION_CONFIG";

/// Run-time options for a calibration run.
///
/// Everything here is optional in the on-disk form, an empty file yields [`Config::default`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the plot is written, any existing file is replaced
    pub output: PathBuf,
    /// Width of the plot in pixels
    pub width: u32,
    /// Height of the plot in pixels
    pub height: u32,
    /// Two-column `reference,measured` table to analyse instead of the built-in LIT-101 data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            width: 1000,
            height: 600,
            data: None,
        }
    }
}

impl Config {
    /// Read a config from a toml file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid config.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "reading config");
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Locate and read the config for a run started in `working_dir`
    ///
    /// An `explicit` path must exist and is always used. Otherwise [`DEFAULT_CONFIG`] is read
    /// from `working_dir` if present, and the defaults apply if it is not.
    ///
    /// # Errors
    /// Returns an error if the chosen file cannot be read or is not a valid config.
    pub fn discover(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let path = working_dir.join(DEFAULT_CONFIG);
        if path.exists() {
            Self::from_file(&path)
        } else {
            info!("no {DEFAULT_CONFIG} found, using defaults");
            Ok(Self::default())
        }
    }

    /// The sample pair this run analyses.
    ///
    /// # Errors
    /// Returns an error if the configured data file cannot be read or fails validation.
    pub fn sample_pair(&self) -> Result<SamplePair> {
        match &self.data {
            Some(path) => SamplePair::from_file(path),
            None => {
                info!("using built-in LIT-101 dataset");
                Ok(SamplePair::lit101())
            }
        }
    }
}
