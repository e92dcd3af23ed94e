use mockito::Matcher;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{tempdir, NamedTempFile};
use vitals_monitor::{
    load_dataset, ArtifactWriter, Config, DiagnosticJob, DiagnosticsError, FileSensor,
    RecordingNotifier, Signal, ThresholdProfile, WebhookNotifier,
};

fn input_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file
}

#[tokio::test]
async fn test_end_to_end_with_webhook() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/services/T0/B0/secret")
        .match_body(Matcher::Regex("#1\\. Average O2 level: 89\\.5".to_string()))
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create_async()
        .await;

    let input = input_file("timestamp,o2_level,heart_rate\n2022-02-03T00:00,99.0,81\n2022-02-03T00:01,80.0,200\n");
    let out = tempdir().unwrap();

    let notifier = WebhookNotifier::new(
        format!("{}/services/T0/B0/secret", server.url()),
        Duration::from_secs(5),
    )
    .unwrap();
    let job = DiagnosticJob::new(
        "P0015".to_string(),
        ThresholdProfile::default(),
        ArtifactWriter::new(out.path(), "P0015"),
        Arc::new(notifier),
    );

    let dataset = load_dataset(input.path()).unwrap();
    let summary = job.run(&dataset).await.unwrap();

    mock.assert_async().await;
    assert_eq!(summary.flagged(Signal::HeartRate), 1);
    assert_eq!(summary.flagged(Signal::O2Level), 1);
    assert_eq!(summary.notified_via, "webhook");

    let hr = std::fs::read_to_string(out.path().join("hr_anomaly_P0015.csv")).unwrap();
    assert_eq!(
        hr,
        ",timestamp,o2_level,heart_rate,heart_rate_anomaly\n1,2022-02-03T00:01,80.0,200,1\n"
    );
}

#[tokio::test]
async fn test_webhook_failure_surfaces_as_notification_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/hook")
        .with_status(500)
        .with_body("upstream down")
        .create_async()
        .await;

    let input = input_file("o2_level,heart_rate\n97.0,80\n96.5,78\n");
    let out = tempdir().unwrap();
    let job = DiagnosticJob::new(
        "P0015".to_string(),
        ThresholdProfile::default(),
        ArtifactWriter::new(out.path(), "P0015"),
        Arc::new(WebhookNotifier::new(format!("{}/hook", server.url()), Duration::from_secs(5)).unwrap()),
    );

    let dataset = load_dataset(input.path()).unwrap();
    let err = job.run(&dataset).await.unwrap_err();
    assert!(matches!(err, DiagnosticsError::Notification(_)));
}

#[tokio::test]
async fn test_missing_column_is_load_error() {
    let input = input_file("timestamp,o2_level\nt0,97.0\n");

    let err = load_dataset(input.path()).unwrap_err();
    let err: DiagnosticsError = err.into();
    assert_eq!(err.kind(), "data_load");
    assert!(err.to_string().contains("heart_rate"));
}

#[tokio::test]
async fn test_all_normal_readings_produce_header_only_artifacts() {
    let input = input_file("o2_level,heart_rate\n96.0,80\n97.5,72\n95.1,91\n");
    let out = tempdir().unwrap();
    let sink = Arc::new(RecordingNotifier::default());

    let mut config = Config::default();
    config.paths.output_dir = out.path().to_path_buf();
    let job = DiagnosticJob::from_config(&config, sink.clone());

    let summary = job.run(&load_dataset(input.path()).unwrap()).await.unwrap();

    assert_eq!(summary.flagged(Signal::HeartRate), 0);
    assert_eq!(summary.flagged(Signal::O2Level), 0);
    assert_eq!(sink.messages().len(), 1);
    assert_eq!(
        std::fs::read_to_string(out.path().join("o2_anomaly_P0015.csv")).unwrap(),
        ",o2_level,heart_rate,o2_level_anomaly\n"
    );
}

#[tokio::test]
async fn test_sensor_then_run() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.paths.input_dir = dir.path().join("input");
    config.paths.output_dir = dir.path().join("output");
    std::fs::create_dir_all(&config.paths.input_dir).unwrap();
    std::fs::write(config.input_path(), "o2_level,heart_rate\n85.0,60\n").unwrap();

    let sensor = FileSensor::new(Duration::from_millis(10), Duration::from_millis(100));
    sensor.wait_for(&config.input_path()).await.unwrap();

    let sink = Arc::new(RecordingNotifier::default());
    let job = DiagnosticJob::from_config(&config, sink.clone());
    let summary = job.run(&load_dataset(&config.input_path()).unwrap()).await.unwrap();

    assert_eq!(summary.flagged(Signal::O2Level), 1);
    assert!(sink.messages()[0].contains("Standard Deviation of O2 level: nan"));
}
