pub mod job;
pub mod runner;
pub mod sensor;

pub use job::{DiagnosticJob, RunSummary, SignalOutcome};
pub use runner::run_with_retries;
pub use sensor::FileSensor;
