use vitals_monitor::{
    load_dataset, run_with_retries, utils, Config, DiagnosticJob, FileSensor,
    LogNotifier, NotificationSink, WebhookNotifier,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Summarize a patient's vital signs, extract 3-sigma anomalies and post
/// the report to the configured webhook
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (falls back to CONFIG_FILE, then config/diagnostics.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input CSV, overrides the configured input location
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for anomaly artifacts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log the report instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// Skip waiting for the input file to appear
    #[arg(long)]
    no_wait: bool,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(&path.to_string_lossy())?,
        None => Config::load()?,
    };
    if let Some(dir) = args.output_dir {
        config.paths.output_dir = dir;
    }
    if args.dry_run {
        config.notification.enabled = false;
    }

    utils::init_from_config(&config.logging)?;
    config.validate()?;

    let input = args.input.unwrap_or_else(|| config.input_path());
    info!(
        patient = %config.general.patient_id,
        owner = %config.general.owner,
        input = %input.display(),
        output = %config.paths.output_dir.display(),
        "Diagnostics starting"
    );

    let sink: Arc<dyn NotificationSink> = match config.notification.webhook_url.as_ref() {
        Some(url) if config.notification.enabled => Arc::new(WebhookNotifier::new(
            url.clone(),
            config.notification_timeout(),
        )?),
        _ => Arc::new(LogNotifier),
    };

    let job = DiagnosticJob::from_config(&config, sink);
    let sensor = FileSensor::new(config.poke_interval(), config.sensor_timeout());
    let wait = !args.no_wait;

    let job = &job;
    let input = input.as_path();

    let summary = run_with_retries(config.job.retries, config.retry_delay(), move |attempt| async move {
        info!(attempt, "Starting run");
        if wait {
            sensor.wait_for(input).await?;
        }
        let dataset = load_dataset(input)?;
        job.run(&dataset).await
    })
    .await?;

    if let Some(path) = args.summary {
        summary.write_json(&path)?;
        info!(path = %path.display(), "Run summary saved");
    }

    Ok(())
}
