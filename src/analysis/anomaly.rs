use crate::data::{Dataset, Observation, Signal};
use crate::error::DataValidationError;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Reference mean and standard deviation of one signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThreshold {
    pub mean: f64,
    pub std_dev: f64,
}

impl SignalThreshold {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// Fixed population baselines the anomaly bounds are derived from.
///
/// These are NOT computed from the loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdProfile {
    pub heart_rate: SignalThreshold,
    pub o2_level: SignalThreshold,
    /// Number of standard deviations tolerated either side of the mean
    pub sigma_multiplier: f64,
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        Self {
            heart_rate: SignalThreshold::new(80.81, 10.28),
            o2_level: SignalThreshold::new(96.19, 1.69),
            sigma_multiplier: 3.0,
        }
    }
}

impl ThresholdProfile {
    pub fn threshold(&self, signal: Signal) -> SignalThreshold {
        match signal {
            Signal::HeartRate => self.heart_rate,
            Signal::O2Level => self.o2_level,
        }
    }

    /// (lower, upper) bounds for a signal
    pub fn bounds(&self, signal: Signal) -> (f64, f64) {
        let t = self.threshold(signal);
        let spread = self.sigma_multiplier * t.std_dev;
        (t.mean - spread, t.mean + spread)
    }

    /// Strictly outside the bounds; values on a bound are normal
    pub fn is_anomalous(&self, signal: Signal, value: f64) -> bool {
        let (lower, upper) = self.bounds(signal);
        value > upper || value < lower
    }
}

/// Rows flagged on one signal, with their original values intact
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalySubset {
    pub signal: Signal,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Header of the source dataset, without the indicator column
    pub headers: Vec<String>,
    pub rows: Vec<Observation>,
    /// Rows examined, flagged or not
    pub total_rows: usize,
}

impl AnomalySubset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.index).collect()
    }
}

/// Per-row 0/1 indicator alongside the original readings
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedColumn {
    pub signal: Signal,
    pub indicator: Vec<u8>,
}

/// 3-sigma anomaly flagger.
///
/// Never touches the dataset it is given: indicators are returned as a
/// separate column and the subset carries copies of the flagged rows.
#[derive(Debug, Clone, Default)]
pub struct AnomalyFlagger {
    profile: ThresholdProfile,
}

impl AnomalyFlagger {
    pub fn new(profile: ThresholdProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ThresholdProfile {
        &self.profile
    }

    /// Binary indicator for every row, in row order
    pub fn indicator(
        &self,
        dataset: &Dataset,
        signal: Signal,
    ) -> Result<FlaggedColumn, DataValidationError> {
        let values = dataset.signal_values(signal)?;
        let indicator = values
            .iter()
            .map(|&v| u8::from(self.profile.is_anomalous(signal, v)))
            .collect();

        Ok(FlaggedColumn { signal, indicator })
    }

    /// Select the rows whose indicator is 1
    pub fn flag(&self, dataset: &Dataset, signal: Signal) -> Result<AnomalySubset, DataValidationError> {
        let column = self.indicator(dataset, signal)?;
        let (lower_bound, upper_bound) = self.profile.bounds(signal);

        let rows: Vec<Observation> = dataset
            .rows()
            .iter()
            .zip(&column.indicator)
            .filter(|(_, flag)| **flag == 1)
            .map(|(row, _)| row.clone())
            .collect();

        info!(
            signal = %signal,
            lower_bound,
            upper_bound,
            flagged = rows.len(),
            total = dataset.len(),
            "Anomaly scan complete"
        );
        for row in &rows {
            info!(signal = %signal, index = row.index, values = ?row.values, "Anomalous row");
        }

        Ok(AnomalySubset {
            signal,
            lower_bound,
            upper_bound,
            headers: dataset.headers().to_vec(),
            rows,
            total_rows: dataset.len(),
        })
    }

    /// Flag every signal; fails before returning anything if any one fails
    pub fn flag_all(&self, dataset: &Dataset) -> Result<Vec<AnomalySubset>, DataValidationError> {
        Signal::ALL
            .iter()
            .map(|&signal| self.flag(dataset, signal))
            .collect()
    }
}
