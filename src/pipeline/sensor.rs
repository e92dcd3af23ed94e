use crate::error::{DataLoadError, DiagnosticsError};
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Polls for an input file before a run is allowed to start
#[derive(Debug, Clone, Copy)]
pub struct FileSensor {
    poke_interval: Duration,
    timeout: Duration,
}

impl FileSensor {
    pub fn new(poke_interval: Duration, timeout: Duration) -> Self {
        Self {
            poke_interval,
            timeout,
        }
    }

    /// Resolve once `path` exists. Always checks at least once, even with a
    /// zero timeout; never sleeps past the deadline. An I/O error other than
    /// "not found" fails immediately as `DataLoadError::Io`.
    pub async fn wait_for(&self, path: &Path) -> Result<(), DiagnosticsError> {
        let deadline = Instant::now() + self.timeout;
        let mut pokes = 0u32;

        loop {
            pokes += 1;
            match tokio::fs::try_exists(path).await {
                Ok(true) => {
                    info!(path = %path.display(), pokes, "Input file available");
                    return Ok(());
                }
                Ok(false) => {}
                Err(source) => {
                    warn!(path = %path.display(), "Cannot check input file: {}", source);
                    return Err(DataLoadError::Io {
                        path: path.to_path_buf(),
                        source,
                    }
                    .into());
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(DiagnosticsError::SensorTimeout {
                    path: path.to_path_buf(),
                    timeout: self.timeout,
                });
            }

            debug!(path = %path.display(), pokes, "Input file not present yet");
            sleep(self.poke_interval.min(deadline - now)).await;
        }
    }
}
