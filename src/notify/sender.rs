//! Webhook delivery.
//!
//! Posts each payload in order as an independent fire-and-forget send. There
//! is no retry or rollback coordination between batches — a failure
//! mid-sequence leaves a partial notification, which is accepted rather than
//! corrected.

use anyhow::{Context as _, Result};
use tracing::{info, warn};

use super::WebhookPayload;

/// Posts rendered payloads to a configured webhook URL.
pub struct WebhookSender {
    http: reqwest::Client,
    url: String,
}

impl WebhookSender {
    pub fn new(url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, url })
    }

    /// Send every payload in order. Returns the number delivered
    /// successfully; failed sends are logged and skipped.
    pub async fn send_all(&self, payloads: &[WebhookPayload]) -> usize {
        let mut delivered = 0;
        for (index, payload) in payloads.iter().enumerate() {
            match self.send_one(payload).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(batch = index, err = %e, "webhook send failed — continuing");
                }
            }
        }
        info!(delivered, total = payloads.len(), "notification batches sent");
        delivered
    }

    async fn send_one(&self, payload: &WebhookPayload) -> Result<()> {
        self.http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .context("webhook request failed")?
            .error_for_status()
            .context("webhook rejected the payload")?;
        Ok(())
    }
}
