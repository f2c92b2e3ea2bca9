// src/ingest/providers/cse.rs
//! Google Custom Search provider.
//!
//! Needs `CSE_API_KEY` and `CSE_CX`; without them the provider logs a warning and
//! returns nothing. LinkedIn results that answer 999/403 (or do not answer) to a
//! HEAD request are skipped since they cannot be reviewed later anyway.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::normalize_text;
use crate::ingest::types::SourceProvider;
use crate::record::CandidateRecord;

pub const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";
pub const SOURCE_LABEL: &str = "google_cse";

#[derive(Debug, Default, Deserialize)]
pub struct CseResponse {
    #[serde(default)]
    pub items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
pub struct CseItem {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone)]
struct Credentials {
    api_key: String,
    cx: String,
}

pub struct CseProvider {
    creds: Option<Credentials>,
    queries: Vec<String>,
    max_results_per_query: usize,
    pause: Duration,
    client: reqwest::Client,
}

impl CseProvider {
    /// Credentials from `CSE_API_KEY` / `CSE_CX`.
    pub fn from_env(queries: Vec<String>, max_results_per_query: usize) -> Self {
        let api_key = std::env::var("CSE_API_KEY").ok().filter(|s| !s.is_empty());
        let cx = std::env::var("CSE_CX").ok().filter(|s| !s.is_empty());
        let creds = match (api_key, cx) {
            (Some(api_key), Some(cx)) => Some(Credentials { api_key, cx }),
            _ => None,
        };
        Self {
            creds,
            queries,
            max_results_per_query,
            pause: Duration::from_secs(1),
            client: reqwest::Client::new(),
        }
    }

    /// Delay between queries (basic rate limiting).
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.creds.is_some()
    }

    /// The API returns at most 10 results per request.
    pub fn page_size(&self) -> usize {
        self.max_results_per_query.clamp(1, 10)
    }

    async fn search(&self, creds: &Credentials, query: &str) -> Result<CseResponse> {
        let num = self.page_size().to_string();
        self.client
            .get(GOOGLE_CSE_URL)
            .query(&[
                ("key", creds.api_key.as_str()),
                ("cx", creds.cx.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .context("cse http get()")?
            .error_for_status()
            .context("cse non-2xx")?
            .json::<CseResponse>()
            .await
            .context("cse json")
    }

    /// HEAD the URL; 999/403 or a transport error counts as blocked.
    async fn is_linkedin_blocked(&self, url: &str) -> bool {
        match self
            .client
            .head(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(rsp) => matches!(rsp.status().as_u16(), 999 | 403),
            Err(_) => true,
        }
    }
}

/// Map API items to records; items without a link are skipped.
pub fn records_from_response(resp: CseResponse) -> Vec<CandidateRecord> {
    resp.items
        .into_iter()
        .filter_map(|it| {
            let link = it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())?;
            let mut rec = CandidateRecord::new(
                normalize_text(it.title.as_deref().unwrap_or_default()),
                normalize_text(it.snippet.as_deref().unwrap_or_default()),
            )
            .with_source(SOURCE_LABEL);
            rec.country_guess = guess_country_from_url(&link);
            rec.url = Some(link);
            Some(rec)
        })
        .collect()
}

/// Two-letter alphabetic TLD, upper-cased ("https://acme.cl/x" → "CL").
pub fn guess_country_from_url(url: &str) -> Option<String> {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let authority = after_scheme.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let host = host_port.split(':').next()?;
    let tld = host.trim_end_matches('.').rsplit('.').next()?;
    if host.contains('.') && tld.len() == 2 && tld.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(tld.to_ascii_uppercase())
    } else {
        None
    }
}

pub fn is_linkedin(url: &str) -> bool {
    url.to_lowercase().contains("linkedin.com")
}

#[async_trait]
impl SourceProvider for CseProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateRecord>> {
        let Some(creds) = &self.creds else {
            tracing::warn!(target: "ingest", "CSE_API_KEY or CSE_CX not set; skipping Google CSE");
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for query in &self.queries {
            match self.search(creds, query).await {
                Ok(resp) => {
                    for rec in records_from_response(resp) {
                        let url = rec.url().unwrap_or_default();
                        if is_linkedin(url) && self.is_linkedin_blocked(url).await {
                            tracing::info!(target: "ingest", id = %rec.fingerprint(), "skipping blocked LinkedIn URL");
                            continue;
                        }
                        out.push(rec);
                    }
                }
                Err(e) => {
                    tracing::error!(target: "ingest", error = ?e, query = %query, "CSE request failed");
                    counter!("ingest_provider_errors_total").increment(1);
                }
            }
            tokio::time::sleep(self.pause).await;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        SOURCE_LABEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn country_guess_from_tld() {
        assert_eq!(guess_country_from_url("https://acme.cl/news"), Some("CL".into()));
        assert_eq!(guess_country_from_url("http://www.startup.com.br:8080/x?y=1"), Some("BR".into()));
        assert_eq!(guess_country_from_url("https://acme.io"), Some("IO".into()));
        assert_eq!(guess_country_from_url("https://acme.com/chile"), None);
        assert_eq!(guess_country_from_url("https://localhost/x"), None);
        assert_eq!(guess_country_from_url("https://acme.x1/"), None);
    }

    #[test]
    fn response_items_to_records() {
        let resp: CseResponse = serde_json::from_value(json!({
            "items": [
                {"title": "Acme &amp; Co raises", "snippet": "Post-revenue  startup", "link": "https://acme.cl/a"},
                {"title": "No link"},
                {"title": "Blank link", "link": "  "}
            ]
        }))
        .unwrap();
        let recs = records_from_response(resp);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "Acme & Co raises");
        assert_eq!(recs[0].snippet, "Post-revenue startup");
        assert_eq!(recs[0].country_guess.as_deref(), Some("CL"));
        assert_eq!(recs[0].source.as_deref(), Some(SOURCE_LABEL));
    }

    #[test]
    fn empty_response_has_no_items() {
        let resp: CseResponse = serde_json::from_value(json!({})).unwrap();
        assert!(records_from_response(resp).is_empty());
    }

    #[test]
    fn linkedin_detection() {
        assert!(is_linkedin("https://www.LinkedIn.com/company/acme"));
        assert!(!is_linkedin("https://acme.cl"));
    }

    #[serial_test::serial]
    #[tokio::test]
    async fn missing_credentials_yield_empty_batch() {
        std::env::remove_var("CSE_API_KEY");
        std::env::remove_var("CSE_CX");
        let p = CseProvider::from_env(vec!["post-revenue Chile".into()], 25);
        assert!(!p.is_configured());
        assert_eq!(p.page_size(), 10);
        assert!(p.fetch_latest().await.unwrap().is_empty());
    }
}
