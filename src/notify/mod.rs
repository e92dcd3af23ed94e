pub mod webhook;

pub use webhook::WebhookNotifier;

use crate::error::NotificationError;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

/// Destination for the textual report
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message
    async fn send(&self, text: &str) -> Result<(), NotificationError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Dry-run sink: writes the message to the log instead of sending it
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), NotificationError> {
        info!(payload = %text, "Dry run, report not sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotificationError> {
        match self.messages.lock() {
            Ok(mut m) => m.push(text.to_string()),
            Err(poisoned) => poisoned.into_inner().push(text.to_string()),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
