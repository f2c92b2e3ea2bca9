// src/sink.rs
//! Lead sinks: where an accepted leads bucket is handed off after a run.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::record::ClassifiedRecord;

#[async_trait::async_trait]
pub trait LeadSink: Send + Sync {
    /// Persist/forward the leads. Must not reorder or alter them.
    async fn deliver(&self, leads: &[ClassifiedRecord]) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Flat CSV row; one per lead.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    snippet: &'a str,
    url: &'a str,
    company: &'a str,
    timestamp: &'a str,
    source: &'a str,
    country_guess: &'a str,
    score: i32,
    classification: &'static str,
}

impl<'a> From<&'a ClassifiedRecord> for CsvRow<'a> {
    fn from(r: &'a ClassifiedRecord) -> Self {
        let rec = &r.record;
        Self {
            title: &rec.title,
            snippet: &rec.snippet,
            url: rec.url.as_deref().unwrap_or_default(),
            company: rec.company(),
            timestamp: rec.timestamp(),
            source: rec.source.as_deref().unwrap_or_default(),
            country_guess: rec.country_guess.as_deref().unwrap_or_default(),
            score: r.score,
            classification: r.classification.as_str(),
        }
    }
}

/// Render leads as CSV (with header).
pub fn render_csv(leads: &[ClassifiedRecord]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for r in leads {
        wtr.serialize(CsvRow::from(r)).context("serialize csv row")?;
    }
    wtr.into_inner().map_err(|e| anyhow::anyhow!("flush csv: {}", e.error()))
}

/// Overwrites `path` with the latest leads (e.g. `data/new_rows.csv`).
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl LeadSink for CsvFileSink {
    async fn deliver(&self, leads: &[ClassifiedRecord]) -> Result<()> {
        let bytes = render_csv(leads)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("writing leads to {}", self.path.display()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CandidateRecord, Classification, SignalHits};

    fn lead(title: &str) -> ClassifiedRecord {
        ClassifiedRecord {
            record: CandidateRecord::new(title, "snippet, with comma")
                .with_url("http://x")
                .with_company("Acme"),
            score: 6,
            signals: SignalHits::default(),
            classification: Classification::Lead,
            excluded: false,
        }
    }

    #[test]
    fn csv_has_header_and_quotes() {
        let bytes = render_csv(&[lead("Acme raises")]).unwrap();
        let s = String::from_utf8(bytes).unwrap();
        let mut lines = s.lines();
        assert_eq!(
            lines.next().unwrap(),
            "title,snippet,url,company,timestamp,source,country_guess,score,classification"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Acme raises,\"snippet, with comma\",http://x,Acme,,,,6,lead"
        );
    }

    #[tokio::test]
    async fn csv_sink_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("new_rows.csv");
        let sink = CsvFileSink::new(&path);
        sink.deliver(&[lead("A"), lead("B")]).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
