use crate::analysis::stats::SignalSummary;
use crate::data::{Dataset, Signal};
use crate::error::{DataValidationError, DiagnosticsError};
use crate::notify::NotificationSink;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Eight scalars describing one patient's readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub o2_level: SignalSummary,
    pub heart_rate: SignalSummary,
}

impl DiagnosticReport {
    /// Compute both summaries; logs every scalar before returning
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, DataValidationError> {
        let o2_level = SignalSummary::from_dataset(dataset, Signal::O2Level)?;
        let heart_rate = SignalSummary::from_dataset(dataset, Signal::HeartRate)?;

        for (signal, summary) in [(Signal::O2Level, &o2_level), (Signal::HeartRate, &heart_rate)] {
            info!(signal = %signal, mean = summary.mean, "Average");
            info!(signal = %signal, std_dev = summary.std_dev, "Standard deviation");
            info!(signal = %signal, min = summary.min, "Minimum");
            info!(signal = %signal, max = summary.max, "Maximum");
        }

        Ok(Self {
            o2_level,
            heart_rate,
        })
    }

    /// Fixed-layout message body
    pub fn render(&self) -> String {
        let o2 = &self.o2_level;
        let hr = &self.heart_rate;

        format!(
            "-------------------------\n\
             Diagnostic Report\n\
             -------------------------\n\
             #1. Average O2 level: {}\n\
             #2. Average Heart Rate: {}\n\
             #3. Standard Deviation of O2 level: {}\n\
             #4. Standard Deviation of Heart Rate: {}\n\
             #5. Minimum O2 level: {}\n\
             #6. Minimum Heart Rate: {}\n\
             #7. Maximum O2 level: {}\n\
             #8. Maximum Heart Rate: {}\n",
            format_reading(o2.mean),
            format_reading(hr.mean),
            format_reading(o2.std_dev),
            format_reading(hr.std_dev),
            format_reading(o2.min),
            format_reading(hr.min),
            format_reading(o2.max),
            format_reading(hr.max),
        )
    }
}

/// Float text as the report has always shown it: `80.0`, `89.5`, `nan`, `inf`
pub fn format_reading(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Builds the diagnostic report and hands it to a notification sink
pub struct ReportGenerator {
    sink: Arc<dyn NotificationSink>,
}

impl ReportGenerator {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub fn generate(&self, dataset: &Dataset) -> Result<DiagnosticReport, DataValidationError> {
        DiagnosticReport::from_dataset(dataset)
    }

    /// Deliver an already computed report; exactly one message per call
    pub async fn deliver(&self, report: &DiagnosticReport) -> Result<(), DiagnosticsError> {
        self.sink.send(&report.render()).await?;
        info!(sink = self.sink.name(), "Diagnostic report sent");
        Ok(())
    }

    /// Generate and deliver in one step
    pub async fn run(&self, dataset: &Dataset) -> Result<DiagnosticReport, DiagnosticsError> {
        let report = self.generate(dataset)?;
        self.deliver(&report).await?;
        Ok(report)
    }
}
