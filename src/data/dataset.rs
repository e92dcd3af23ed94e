use crate::error::DataValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A measured physiological value carried by every observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    O2Level,
    HeartRate,
}

impl Signal {
    pub const ALL: [Signal; 2] = [Signal::HeartRate, Signal::O2Level];

    /// Column name in the input file
    pub fn column(&self) -> &'static str {
        match self {
            Signal::O2Level => "o2_level",
            Signal::HeartRate => "heart_rate",
        }
    }

    /// Prefix of the anomaly artifact file name
    pub fn artifact_prefix(&self) -> &'static str {
        match self {
            Signal::O2Level => "o2",
            Signal::HeartRate => "hr",
        }
    }

    /// Name of the 0/1 indicator column added next to the original values
    pub fn indicator_column(&self) -> String {
        format!("{}_anomaly", self.column())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One input row
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Zero-based position in the source file
    pub index: usize,
    pub values: Vec<String>,
}

/// Rows of vital-sign readings, loaded once per run.
///
/// Values are kept as text so every original column survives into the
/// anomaly artifacts untouched; signal columns are parsed on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Observation>,
}

impl Dataset {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row; the index is assigned from the current length
    pub fn push_row(&mut self, values: Vec<String>) {
        let index = self.rows.len();
        self.rows.push(Observation { index, values });
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Parse a signal column into floats, in row order
    pub fn signal_values(&self, signal: Signal) -> Result<Vec<f64>, DataValidationError> {
        self.numeric_column(signal.column())
    }

    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, DataValidationError> {
        let col = self
            .column_index(name)
            .ok_or_else(|| DataValidationError::UnknownColumn(name.to_string()))?;

        if self.rows.is_empty() {
            return Err(DataValidationError::Empty);
        }

        self.rows
            .iter()
            .map(|row| {
                let raw = row.values.get(col).map(String::as_str).unwrap_or("");
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| !v.is_nan())
                    .ok_or_else(|| DataValidationError::NonNumeric {
                        column: name.to_string(),
                        row: row.index,
                        value: raw.to_string(),
                    })
            })
            .collect()
    }
}
