// src/ingest/mod.rs
//! Boundary: collects raw candidate records from providers into one batch.
//! Provider failures are logged and counted; they never abort the batch.

pub mod providers;
pub mod types;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::path::Path;

use crate::ingest::types::SourceProvider;
use crate::record::CandidateRecord;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_records_total", "Records returned by providers.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, fold smart quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Fetch from every provider and concatenate, in provider order.
pub async fn collect_batch(providers: &[Box<dyn SourceProvider>]) -> Vec<CandidateRecord> {
    ensure_metrics_described();

    let mut batch = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::info!(target: "ingest", provider = p.name(), count = v.len(), "provider fetched");
                counter!("ingest_records_total").increment(v.len() as u64);
                batch.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }
    batch
}

/// Read a JSON array of records (e.g. an exported sheet or a saved search).
pub fn read_batch_json(path: &Path) -> Result<Vec<CandidateRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch from {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing batch {}", path.display()))
}
