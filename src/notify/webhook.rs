use crate::error::NotificationError;
use crate::notify::NotificationSink;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Incoming-webhook client (Slack-compatible `{"text": ...}` payload)
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Create new webhook client
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotificationError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn send(&self, text: &str) -> Result<(), NotificationError> {
        info!(bytes = text.len(), "Posting report to webhook");

        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Webhook rejected report: {} - {}", status, body);
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
