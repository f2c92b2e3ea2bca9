//! Scorer: weighted sum of present signal categories, clamped to [0, 10].
//!
//! score = Σ weight(category) for every category whose signal fired.
//! The sector penalty is just a category with a negative weight. Geo counts once
//! no matter how many countries or aliases matched.

use super::signals;
use crate::config::SignalConfig;
use crate::record::{CandidateRecord, ScoredRecord, SignalHits};

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 10;

/// Raw (unclamped) weighted sum for a set of hits.
pub fn weighted_sum(hits: &SignalHits, cfg: &SignalConfig) -> i32 {
    let w = &cfg.weights;
    let mut total = 0i32;
    if hits.geo {
        total += w.geo.weight;
    }
    if hits.post_revenue {
        total += w.post_revenue.weight;
    }
    if hits.enterprise {
        total += w.enterprise.weight;
    }
    if hits.fintech_penalty {
        total += w.fintech_penalty.weight;
    }
    for name in &hits.extra {
        total += w.extra.get(name).map(|s| s.weight).unwrap_or(0);
    }
    total
}

/// Score one record. Pure; the input is left untouched.
pub fn score_record(record: &CandidateRecord, cfg: &SignalConfig) -> ScoredRecord {
    let signals = signals::detect(record, cfg);
    let score = weighted_sum(&signals, cfg).clamp(MIN_SCORE, MAX_SCORE);
    ScoredRecord {
        record: record.clone(),
        score,
        signals,
    }
}
