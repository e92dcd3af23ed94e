pub mod anomaly;
pub mod report;
pub mod stats;

pub use anomaly::{AnomalyFlagger, AnomalySubset, FlaggedColumn, SignalThreshold, ThresholdProfile};
pub use report::{DiagnosticReport, ReportGenerator};
pub use stats::SignalSummary;
