// src/notify/mod.rs
//! Run-summary notifications (Slack webhook, SMTP e-mail).
//! Best effort: a failing channel is logged and never affects the run result.

pub mod email;
pub mod slack;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::{Delivery, RunReport};

pub use email::EmailNotifier;
pub use slack::SlackNotifier;

/// What a sourcing run produced, in notification-sized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub leads_added: usize,
    pub review_count: usize,
    pub dropped: usize,
    pub duplicates_removed: usize,
    pub delivery: Delivery,
    pub ts: DateTime<Utc>,
}

impl RunSummary {
    pub fn from_report(report: &RunReport, ts: DateTime<Utc>) -> Self {
        let s = report.output.stats;
        Self {
            leads_added: s.leads,
            review_count: s.review,
            dropped: s.dropped,
            duplicates_removed: s.duplicates_removed,
            delivery: report.delivery.clone(),
            ts,
        }
    }

    /// First line of every notification.
    pub fn headline(&self) -> String {
        if self.leads_added > 0 {
            format!("VC sourcing run added {} new leads", self.leads_added)
        } else {
            "No new leads added".to_string()
        }
    }

    pub fn message(&self) -> String {
        let mut msg = format!(
            "{}\nFor review: {} · dropped: {} · duplicates merged: {}",
            self.headline(),
            self.review_count,
            self.dropped,
            self.duplicates_removed
        );
        if let Delivery::Failed { sink, reason } = &self.delivery {
            msg.push_str(&format!("\nWARNING: leads could not be delivered to {sink}: {reason}"));
        }
        msg
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, summary: &RunSummary) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fans a summary out to every configured channel.
#[derive(Default)]
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    /// Slack if `SLACK_WEBHOOK_URL` is set; e-mail if all SMTP_* vars are set.
    pub fn from_env() -> Self {
        let mut mux = Self::default();
        if let Some(slack) = SlackNotifier::from_env() {
            mux = mux.with(Box::new(slack));
        }
        match EmailNotifier::from_env() {
            Ok(Some(email)) => mux = mux.with(Box::new(email)),
            Ok(None) => tracing::debug!(target: "notify", "e-mail disabled (SMTP_* not set)"),
            Err(e) => tracing::warn!(target: "notify", error = ?e, "e-mail disabled (bad SMTP config)"),
        }
        mux
    }

    pub fn with(mut self, channel: Box<dyn Notifier>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Send to all channels; returns how many succeeded.
    pub async fn notify(&self, summary: &RunSummary) -> usize {
        let mut ok = 0usize;
        for ch in &self.channels {
            match ch.send(summary).await {
                Ok(()) => {
                    tracing::info!(target: "notify", channel = ch.name(), "notification sent");
                    ok += 1;
                }
                Err(e) => {
                    tracing::warn!(target: "notify", channel = ch.name(), error = ?e, "notification failed");
                }
            }
        }
        ok
    }
}
