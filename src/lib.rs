pub mod analysis;
pub mod data;
pub mod error;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use analysis::{
    AnomalyFlagger, AnomalySubset, DiagnosticReport, ReportGenerator,
    SignalSummary, SignalThreshold, ThresholdProfile,
};
pub use data::{load_dataset, Dataset, Observation, Signal};
pub use error::{
    DataLoadError, DataValidationError, DiagnosticsError, NotificationError, PersistenceError,
};
pub use notify::{LogNotifier, NotificationSink, RecordingNotifier, WebhookNotifier};
pub use output::ArtifactWriter;
pub use pipeline::{run_with_retries, DiagnosticJob, FileSensor, RunSummary};
pub use utils::Config;
