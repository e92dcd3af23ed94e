use tracing::Subscriber;
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use std::path::Path;
use std::sync::Mutex;

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Build the subscriber without installing it.
///
/// With a log file, output (pretty or JSON) goes to that file in append
/// mode instead of stdout.
pub fn build_subscriber(
    level: &str,
    json_output: bool,
    log_file: Option<&Path>,
) -> std::io::Result<BoxedSubscriber> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let file = match log_file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter);

    let subscriber: BoxedSubscriber = match (json_output, file) {
        // JSON formatting for log shippers
        (true, Some(file)) => Box::new(registry.with(fmt::layer().json().with_writer(Mutex::new(file)))),
        (true, None) => Box::new(registry.with(fmt::layer().json())),
        // Pretty formatting for interactive runs; no colour codes in files
        (false, Some(file)) => Box::new(
            registry.with(
                fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
        ),
        (false, None) => Box::new(registry.with(fmt::layer().pretty().with_target(false))),
    };

    Ok(subscriber)
}

/// Initialize logging system
///
/// RUST_LOG, when set, overrides `level`. Fails only if the log file cannot
/// be opened; a second initialization is silently ignored.
pub fn init_logger(level: &str, json_output: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    build_subscriber(level, json_output, log_file)?.try_init().ok();
    Ok(())
}

/// Initialize logger from config
pub fn init_from_config(config: &crate::utils::config::LoggingConfig) -> std::io::Result<()> {
    let json = config.output == "json";
    let log_file = if !config.file_path.is_empty() {
        Some(Path::new(&config.file_path))
    } else {
        None
    };

    init_logger(&config.level, json, log_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::LoggingConfig;

    #[test]
    fn test_json_log_file_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.log");
        let config = LoggingConfig {
            level: "debug".to_string(),
            output: "json".to_string(),
            file_path: path.to_string_lossy().into_owned(),
        };

        init_from_config(&config).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_pretty_output_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pretty.log");

        let subscriber = build_subscriber("info", false, Some(&path)).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(patient = "P0015", "pretty file line");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("pretty file line"));
        assert!(contents.contains("P0015"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn test_json_output_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("json.log");

        let subscriber = build_subscriber("info", true, Some(&path)).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("json file line");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(line["fields"]["message"], "json file line");
    }

    #[test]
    fn test_unwritable_log_file_is_error() {
        let result = init_logger("info", true, Some(Path::new("/nonexistent-dir/x/diag.log")));
        assert!(result.is_err());
    }
}
