use std::fs;
use std::path::Path;

use ndarray::{arr1, Array1};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{Error, Result};

/// Readings of the local sight glass used as the reference standard, in mm
const LIT101_REFERENCE: [f64; 10] = [
    485.0, 449.0, 398.0, 350.0, 298.0, 252.0, 201.0, 147.0, 104.0, 65.0,
];

/// Readings of the LIT-101 transmitter taken at the same levels, in mm
const LIT101_MEASURED: [f64; 10] = [
    480.5, 448.7, 395.3, 347.7, 297.9, 252.2, 202.0, 149.8, 105.8, 66.8,
];

/// Index-aligned readings of the reference standard and of the instrument under calibration.
///
/// A pair is validated once on construction and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplePair {
    reference: Array1<f64>,
    measured: Array1<f64>,
}

#[derive(Deserialize)]
struct Row(f64, f64);

impl SamplePair {
    /// Build a sample pair from two index-aligned sequences
    ///
    /// # Errors
    /// Returns an error if the sequences differ in length, hold fewer than three points (which
    /// would leave no degree of freedom after fitting a line) or contain a non-finite value.
    pub fn new(reference: Array1<f64>, measured: Array1<f64>) -> Result<Self> {
        if reference.len() != measured.len() {
            return Err(Error::LengthMismatch {
                reference: reference.len(),
                measured: measured.len(),
            });
        }
        if reference.len() < 3 {
            return Err(Error::TooFewPoints(reference.len()));
        }
        if let Some(index) = reference
            .iter()
            .zip(measured.iter())
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(Error::NonFinite { index });
        }

        Ok(Self {
            reference,
            measured,
        })
    }

    /// The ten-point dataset recorded for the LIT-101 level transmitter
    pub fn lit101() -> Self {
        Self {
            reference: arr1(&LIT101_REFERENCE),
            measured: arr1(&LIT101_MEASURED),
        }
    }

    /// Create a `SamplePair` from an on-disk `reference,measured` table with a header row
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, a row does not hold two numbers, or the
    /// resulting sequences fail the checks in [`SamplePair::new`].
    pub fn from_file(filepath: &Path) -> Result<Self> {
        info!(path = %filepath.display(), "reading sample pairs");
        let file = fs::read(filepath)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(&file[..]);

        let mut reference = vec![];
        let mut measured = vec![];
        for result in rdr.deserialize() {
            let record: Row = result?;
            reference.push(record.0);
            measured.push(record.1);
        }
        debug!(rows = reference.len(), "parsed sample pairs");

        Self::new(Array1::from(reference), Array1::from(measured))
    }

    pub const fn reference(&self) -> &Array1<f64> {
        &self.reference
    }

    pub const fn measured(&self) -> &Array1<f64> {
        &self.measured
    }

    pub fn len(&self) -> usize {
        self.reference.len()
    }

    /// A validated pair holds at least three points, so this is always false
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }
}
