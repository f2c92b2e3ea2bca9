//! Deduplication of classified records.
//!
//! Two records are equivalent when
//! - both URLs are present and identical, or
//! - title similarity >= threshold AND company similarity >= threshold (0–100 scale).
//!
//! Records are visited in input order. Each one is compared against the current
//! survivors in order; the first equivalent survivor is kept or replaced depending
//! on rank (higher score, then later timestamp). Otherwise the record becomes a
//! new survivor. Quadratic, which is fine for batches of a few hundred.
//!
//! Similarity: Indel ratio over token-sorted text,
//! `2 * LCS(a, b) / (len(a) + len(b))` scaled to 0..=100. A one-character suffix
//! ("Ltd" vs "Ltda") costs one edit out of both lengths, not out of the longer one.

use crate::config::{DedupeConfig, MatcherKind};
use crate::record::{CandidateRecord, ClassifiedRecord};

/// Text similarity capability, scaled 0..=100.
pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> u8;
    fn name(&self) -> &'static str;
}

/// Token-order- and case-insensitive fuzzy similarity.
#[cfg(feature = "fuzzy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

#[cfg(feature = "fuzzy")]
impl SimilarityScorer for TokenSortRatio {
    fn similarity(&self, a: &str, b: &str) -> u8 {
        let a = token_sort_key(a);
        let b = token_sort_key(b);
        indel_ratio(&a, &b)
    }

    fn name(&self) -> &'static str {
        "token_sort"
    }
}

/// 2 * LCS / total length, on chars, scaled to 0..=100. Two empty strings are identical.
#[cfg(feature = "fuzzy")]
pub fn indel_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let lcs = lcs_len(&a, &b);
    ((200 * lcs) as f64 / total as f64).round().clamp(0.0, 100.0) as u8
}

/// Longest common subsequence length, two-row DP.
#[cfg(feature = "fuzzy")]
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Degraded matcher: 100 for equal (trimmed, lowercased) strings, 0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl SimilarityScorer for ExactMatch {
    fn similarity(&self, a: &str, b: &str) -> u8 {
        if a.trim().to_lowercase() == b.trim().to_lowercase() {
            100
        } else {
            0
        }
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

/// Lowercase, split on anything that is not alphanumeric, sort tokens, rejoin.
/// "ACME, Inc." and "Inc acme" both become "acme inc".
pub fn token_sort_key(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Pick the scorer for `kind`. Fuzzy degrades to exact when built without `fuzzy`.
pub fn scorer_for(kind: MatcherKind) -> Box<dyn SimilarityScorer> {
    match kind {
        MatcherKind::Exact => Box::new(ExactMatch),
        MatcherKind::Fuzzy => fuzzy_or_exact(),
    }
}

#[cfg(feature = "fuzzy")]
fn fuzzy_or_exact() -> Box<dyn SimilarityScorer> {
    Box::new(TokenSortRatio)
}

#[cfg(not(feature = "fuzzy"))]
fn fuzzy_or_exact() -> Box<dyn SimilarityScorer> {
    tracing::warn!(
        target: "dedupe",
        "fuzzy matching unavailable (built without `fuzzy`); falling back to exact title/company matching"
    );
    Box::new(ExactMatch)
}

/// Result of one dedupe pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicated {
    pub survivors: Vec<ClassifiedRecord>,
    /// Records absorbed into (or replaced by) another survivor.
    pub removed: usize,
}

pub struct Deduplicator {
    scorer: Box<dyn SimilarityScorer>,
    threshold: u8,
}

impl std::fmt::Debug for Deduplicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deduplicator")
            .field("scorer", &self.scorer.name())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl Deduplicator {
    pub fn new(scorer: Box<dyn SimilarityScorer>, threshold: u8) -> Self {
        Self {
            scorer,
            threshold: threshold.min(100),
        }
    }

    pub fn from_config(cfg: &DedupeConfig) -> Self {
        Self::new(scorer_for(cfg.matcher), cfg.threshold)
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    fn similar(&self, a: &str, b: &str) -> bool {
        self.scorer.similarity(&a.to_lowercase(), &b.to_lowercase()) >= self.threshold
    }

    /// Same URL, or both title and company similar.
    pub fn is_equivalent(&self, a: &CandidateRecord, b: &CandidateRecord) -> bool {
        if let (Some(ua), Some(ub)) = (a.url(), b.url()) {
            if ua == ub {
                return true;
            }
        }
        self.similar(&a.title, &b.title) && self.similar(a.company(), b.company())
    }

    pub fn dedupe(&self, records: Vec<ClassifiedRecord>) -> Deduplicated {
        let mut survivors: Vec<ClassifiedRecord> = Vec::with_capacity(records.len());
        let mut removed = 0usize;

        for rec in records {
            let hit = survivors
                .iter()
                .position(|s| self.is_equivalent(&rec.record, &s.record));

            match hit {
                None => survivors.push(rec),
                Some(idx) => {
                    removed += 1;
                    if rec.outranks(&survivors[idx]) {
                        tracing::debug!(
                            target: "dedupe",
                            kept = %rec.record.fingerprint(),
                            replaced = %survivors[idx].record.fingerprint(),
                            "duplicate outranks survivor"
                        );
                        survivors[idx] = rec;
                    } else {
                        tracing::debug!(
                            target: "dedupe",
                            kept = %survivors[idx].record.fingerprint(),
                            dropped = %rec.record.fingerprint(),
                            "duplicate absorbed"
                        );
                    }
                }
            }
        }

        Deduplicated { survivors, removed }
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::from_config(&DedupeConfig::default())
    }
}
