use crate::analysis::{AnomalyFlagger, DiagnosticReport, ReportGenerator, ThresholdProfile};
use crate::data::{Dataset, Signal};
use crate::error::DiagnosticsError;
use crate::notify::NotificationSink;
use crate::output::ArtifactWriter;
use crate::utils::Config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// What one signal's anomaly scan produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalOutcome {
    pub signal: Signal,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub flagged: usize,
    pub artifact: PathBuf,
}

/// Record of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub patient_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows: usize,
    pub report: DiagnosticReport,
    pub anomalies: Vec<SignalOutcome>,
    pub notified_via: String,
}

impl RunSummary {
    pub fn flagged(&self, signal: Signal) -> usize {
        self.anomalies
            .iter()
            .find(|o| o.signal == signal)
            .map_or(0, |o| o.flagged)
    }

    /// Save as pretty JSON
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// The diagnostics workflow: summary report plus anomaly artifacts
pub struct DiagnosticJob {
    patient_id: String,
    generator: ReportGenerator,
    flagger: AnomalyFlagger,
    writer: ArtifactWriter,
    sink_name: &'static str,
}

impl DiagnosticJob {
    pub fn new(
        patient_id: String,
        profile: ThresholdProfile,
        writer: ArtifactWriter,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let sink_name = sink.name();
        Self {
            patient_id,
            generator: ReportGenerator::new(sink),
            flagger: AnomalyFlagger::new(profile),
            writer,
            sink_name,
        }
    }

    pub fn from_config(config: &Config, sink: Arc<dyn NotificationSink>) -> Self {
        Self::new(
            config.general.patient_id.clone(),
            config.thresholds,
            ArtifactWriter::new(&config.paths.output_dir, &config.general.patient_id),
            sink,
        )
    }

    /// Run both computations over `dataset`.
    ///
    /// Each computation works on its own copy. Everything is computed and
    /// validated before the first side effect, so a bad dataset leaves no
    /// artifacts and sends nothing. Artifacts are written before the report
    /// is sent; a delivery failure leaves the artifacts in place.
    #[instrument(skip_all, fields(patient = %self.patient_id, rows = dataset.len()))]
    pub async fn run(&self, dataset: &Dataset) -> Result<RunSummary, DiagnosticsError> {
        let started_at = Utc::now();
        let run_id = format!("{}-{}", self.patient_id, started_at.format("%Y%m%dT%H%M%SZ"));
        info!(run_id = %run_id, "Diagnostics run started");

        let report_input = dataset.clone();
        let flag_input = dataset.clone();

        let report = self.generator.generate(&report_input)?;
        let subsets = self.flagger.flag_all(&flag_input)?;

        let artifacts = self.writer.persist_all(&subsets)?;
        self.generator.deliver(&report).await?;

        let anomalies = subsets
            .iter()
            .zip(artifacts)
            .map(|(subset, artifact)| SignalOutcome {
                signal: subset.signal,
                lower_bound: subset.lower_bound,
                upper_bound: subset.upper_bound,
                flagged: subset.len(),
                artifact,
            })
            .collect();

        let summary = RunSummary {
            run_id,
            patient_id: self.patient_id.clone(),
            started_at,
            finished_at: Utc::now(),
            rows: dataset.len(),
            report,
            anomalies,
            notified_via: self.sink_name.to_string(),
        };

        info!(
            run_id = %summary.run_id,
            hr_flagged = summary.flagged(Signal::HeartRate),
            o2_flagged = summary.flagged(Signal::O2Level),
            "Diagnostics run finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use tempfile::tempdir;

    fn dataset(rows: &[(&str, &str)]) -> Dataset {
        let mut ds = Dataset::new(vec!["o2_level".to_string(), "heart_rate".to_string()]);
        for (o2, hr) in rows {
            ds.push_row(vec![o2.to_string(), hr.to_string()]);
        }
        ds
    }

    fn job(dir: &Path, sink: Arc<RecordingNotifier>) -> DiagnosticJob {
        DiagnosticJob::new(
            "P0015".to_string(),
            ThresholdProfile::default(),
            ArtifactWriter::new(dir, "P0015"),
            sink,
        )
    }

    #[tokio::test]
    async fn test_reference_run() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(RecordingNotifier::default());
        let ds = dataset(&[("99.0", "81"), ("80.0", "200")]);

        let summary = job(dir.path(), sink.clone()).run(&ds).await.unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.flagged(Signal::HeartRate), 1);
        assert_eq!(summary.flagged(Signal::O2Level), 1);
        assert_eq!(summary.notified_via, "recording");
        assert!(summary.run_id.starts_with("P0015-"));
        assert_eq!(sink.messages().len(), 1);

        let hr = std::fs::read_to_string(dir.path().join("hr_anomaly_P0015.csv")).unwrap();
        assert_eq!(hr, ",o2_level,heart_rate,heart_rate_anomaly\n1,80.0,200,1\n");
        let o2 = std::fs::read_to_string(dir.path().join("o2_anomaly_P0015.csv")).unwrap();
        assert_eq!(o2, ",o2_level,heart_rate,o2_level_anomaly\n1,80.0,200,1\n");
    }

    #[tokio::test]
    async fn test_report_uses_original_values() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(RecordingNotifier::default());
        let ds = dataset(&[("99.0", "81"), ("80.0", "200")]);

        let summary = job(dir.path(), sink).run(&ds).await.unwrap();

        // Flagging must not leak 0/1 indicators into the statistics
        assert_eq!(summary.report.heart_rate.max, 200.0);
        assert_eq!(summary.report.o2_level.min, 80.0);
    }

    #[tokio::test]
    async fn test_invalid_dataset_has_no_side_effects() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(RecordingNotifier::default());
        let ds = dataset(&[("99.0", "81"), ("80.0", "abc")]);

        let err = job(dir.path(), sink.clone()).run(&ds).await.unwrap_err();

        assert_eq!(err.kind(), "data_validation");
        assert!(sink.messages().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_dataset_rejected() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(RecordingNotifier::default());

        let err = job(dir.path(), sink.clone()).run(&dataset(&[])).await.unwrap_err();
        assert_eq!(err.kind(), "data_validation");
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_summary_serializes() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(RecordingNotifier::default());
        let ds = dataset(&[("97.0", "80"), ("96.0", "82")]);

        let summary = job(dir.path(), sink).run(&ds).await.unwrap();
        let path = dir.path().join("summary.json");
        summary.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["patient_id"], "P0015");
        assert_eq!(value["anomalies"][0]["signal"], "heart_rate");
        assert_eq!(value["anomalies"][0]["flagged"], 0);
    }
}
