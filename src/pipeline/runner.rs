use crate::error::DiagnosticsError;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Run `op` once, then up to `retries` more times after a failure.
///
/// `op` receives the 1-based attempt number. The last error is returned
/// when every attempt fails.
pub async fn run_with_retries<F, Fut, T>(
    retries: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, DiagnosticsError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, DiagnosticsError>>,
{
    let attempts = retries.saturating_add(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(
                    attempt,
                    attempts,
                    kind = e.kind(),
                    "Run failed, retrying in {:?}: {}",
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(attempt, kind = e.kind(), "Run failed: {}", e);
                return Err(e);
            }
        }
    }
}
