use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Input artifact could not be turned into a dataset
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("required column '{column}' missing from {}", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

/// Loaded dataset cannot feed a computation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataValidationError {
    #[error("dataset has zero rows")]
    Empty,

    #[error("column '{0}' not present in dataset")]
    UnknownColumn(String),

    #[error("non-numeric value '{value}' in column '{column}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

/// Output artifact could not be written
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Report payload could not be delivered
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("webhook transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook rejected message: {status} - {body}")]
    Rejected { status: u16, body: String },
}

/// Everything a diagnostics run can fail with
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    DataValidation(#[from] DataValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("input {} did not appear within {timeout:?}", path.display())]
    SensorTimeout { path: PathBuf, timeout: Duration },
}

impl DiagnosticsError {
    /// Short machine-friendly kind, used in run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            DiagnosticsError::DataLoad(_) => "data_load",
            DiagnosticsError::DataValidation(_) => "data_validation",
            DiagnosticsError::Persistence(_) => "persistence",
            DiagnosticsError::Notification(_) => "notification",
            DiagnosticsError::Config(_) => "config",
            DiagnosticsError::SensorTimeout { .. } => "sensor_timeout",
        }
    }
}

pub type Result<T, E = DiagnosticsError> = std::result::Result<T, E>;
