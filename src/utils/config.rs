use crate::analysis::ThresholdProfile;
use crate::error::DiagnosticsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub paths: PathsConfig,
    pub thresholds: ThresholdProfile,
    pub notification: NotificationConfig,
    pub sensor: SensorConfig,
    pub job: JobConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub patient_id: String,
    pub owner: String,
    pub contact_email: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            patient_id: "P0015".to_string(),
            owner: "diagnostics".to_string(),
            contact_email: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// File name inside `input_dir`; `{patient}` is replaced by the patient id
    pub input_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/input"),
            output_dir: PathBuf::from("data/output"),
            input_file: "diag_metrics_{patient}.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    /// Never committed to config files; set DIAG_NOTIFICATION__WEBHOOK_URL
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webhook_url: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub poke_interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            poke_interval_secs: 15,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub retries: u32,
    pub retry_delay_secs: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            retries: 0,
            retry_delay_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub output: String,
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: "pretty".to_string(),
            file_path: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DiagnosticsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DiagnosticsError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, DiagnosticsError> {
        toml::from_str(contents).map_err(|e| DiagnosticsError::Config(e.to_string()))
    }

    /// Layered load: optional TOML file, then `DIAG_*` environment overrides.
    ///
    /// The file comes from CONFIG_FILE, defaulting to config/diagnostics.toml.
    pub fn load() -> Result<Self, DiagnosticsError> {
        let path = std::env::var("CONFIG_FILE")
            .unwrap_or_else(|_| "config/diagnostics.toml".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, DiagnosticsError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("DIAG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DiagnosticsError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| DiagnosticsError::Config(e.to_string()))
    }

    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> Result<(), DiagnosticsError> {
        if self.general.patient_id.trim().is_empty() {
            return Err(DiagnosticsError::Config("general.patient_id is empty".to_string()));
        }

        for (name, t) in [
            ("heart_rate", self.thresholds.heart_rate),
            ("o2_level", self.thresholds.o2_level),
        ] {
            if !(t.std_dev.is_finite() && t.std_dev > 0.0) || !t.mean.is_finite() {
                return Err(DiagnosticsError::Config(format!(
                    "thresholds.{} needs a finite mean and a positive std_dev",
                    name
                )));
            }
        }
        let k = self.thresholds.sigma_multiplier;
        if !(k.is_finite() && k > 0.0) {
            return Err(DiagnosticsError::Config(
                "thresholds.sigma_multiplier must be positive".to_string(),
            ));
        }

        if self.notification.enabled {
            let raw = self.notification.webhook_url.as_deref().ok_or_else(|| {
                DiagnosticsError::Config(
                    "notification.webhook_url is required when notifications are enabled".to_string(),
                )
            })?;
            let parsed = url::Url::parse(raw)
                .map_err(|e| DiagnosticsError::Config(format!("notification.webhook_url: {}", e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DiagnosticsError::Config(format!(
                    "notification.webhook_url: unsupported scheme '{}'",
                    parsed.scheme()
                )));
            }
        }

        Ok(())
    }

    /// Full path of the input CSV for the configured patient
    pub fn input_path(&self) -> PathBuf {
        self.paths
            .input_dir
            .join(self.paths.input_file.replace("{patient}", &self.general.patient_id))
    }

    pub fn poke_interval(&self) -> Duration {
        Duration::from_secs(self.sensor.poke_interval_secs)
    }

    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_secs(self.sensor.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.job.retry_delay_secs)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification.timeout_secs)
    }
}
