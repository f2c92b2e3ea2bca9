use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{Notifier, RunSummary};

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    /// `None` when `SLACK_WEBHOOK_URL` is unset or empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("SLACK_WEBHOOK_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .map(Self::new)
    }

    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Slack incoming-webhook body.
pub fn payload(summary: &RunSummary) -> serde_json::Value {
    serde_json::json!({ "text": summary.message() })
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, summary: &RunSummary) -> Result<()> {
        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&payload(summary))
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
