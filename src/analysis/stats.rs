use crate::data::{Dataset, Signal};
use crate::error::DataValidationError;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary statistics of one signal column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN for a single row
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SignalSummary {
    pub fn from_values(values: &[f64]) -> Result<Self, DataValidationError> {
        if values.is_empty() {
            return Err(DataValidationError::Empty);
        }

        // Fully qualified: Iterator::min/max would otherwise shadow these
        Ok(Self {
            mean: Statistics::mean(values),
            std_dev: Statistics::std_dev(values),
            min: Statistics::min(values),
            max: Statistics::max(values),
        })
    }

    pub fn from_dataset(dataset: &Dataset, signal: Signal) -> Result<Self, DataValidationError> {
        let values = dataset.signal_values(signal)?;
        Self::from_values(&values)
    }
}
