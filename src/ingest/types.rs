// src/ingest/types.rs
use anyhow::Result;

use crate::record::CandidateRecord;

/// A source of raw candidate records (feeds, search APIs, uploads).
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<CandidateRecord>>;
    fn name(&self) -> &'static str;
}
