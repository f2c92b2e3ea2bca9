// src/analyze/mod.rs
//! Analysis core: signal matching, scoring, classification, deduplication.
//! Synchronous and pure; all I/O lives in `ingest`, `sink` and `notify`.

pub mod classify;
pub mod dedupe;
pub mod scoring;
pub mod signals;

// Re-export convenient types.
pub use crate::analyze::classify::classify;
pub use crate::analyze::dedupe::{
    scorer_for, Deduplicated, Deduplicator, ExactMatch, SimilarityScorer,
};
#[cfg(feature = "fuzzy")]
pub use crate::analyze::dedupe::TokenSortRatio;
pub use crate::analyze::scoring::score_record;

use crate::config::SignalConfig;
use crate::record::{CandidateRecord, ClassifiedRecord};

/// Score + classify in one step (no dedupe).
pub fn evaluate(record: &CandidateRecord, cfg: &SignalConfig) -> ClassifiedRecord {
    classify(score_record(record, cfg), cfg)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::SignalConfig;

    /// The shipped `config/sourcing.toml`.
    pub fn config() -> SignalConfig {
        SignalConfig::from_toml_str(include_str!("../../config/sourcing.toml"))
            .expect("shipped config parses")
    }
}
