//! record.rs: lead records as they move through the pipeline.
//!
//! Each stage takes ownership of the previous stage's value and returns a new one:
//! `CandidateRecord` (ingested) → `ScoredRecord` (score + signals) → `ClassifiedRecord`.
//! A score or classification therefore cannot be observed before it is assigned.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One prospective lead as produced by ingestion (search results, feed items, uploads).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub title: String,
    #[serde(default, alias = "summary")]
    pub snippet: String,
    #[serde(default, alias = "link", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// ISO-like string; compared lexicographically as a recency tie-breaker.
    #[serde(default, alias = "published", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Provenance label set by ingestion (e.g. "google_cse" or a feed title).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Two-letter country code guessed from the URL's TLD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_guess: Option<String>,
}

impl CandidateRecord {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: None,
            company: None,
            timestamp: None,
            source: None,
            country_guess: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_timestamp(mut self, ts: impl Into<String>) -> Self {
        self.timestamp = Some(ts.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Non-empty URL, if any. An empty string counts as absent.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    pub fn company(&self) -> &str {
        self.company.as_deref().unwrap_or_default()
    }

    pub fn timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or_default()
    }

    /// Short anonymized id for logs; raw titles and snippets are never logged.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.url().unwrap_or_default().as_bytes());
        hasher.update(b"\n");
        hasher.update(self.title.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(12);
        for b in digest.iter().take(6) {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        out
    }
}

/// Which signal categories fired for a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalHits {
    pub geo: bool,
    pub post_revenue: bool,
    pub enterprise: bool,
    pub fintech_penalty: bool,
    /// Extra configured categories that matched, by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

/// Candidate plus its bounded score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: CandidateRecord,
    /// Always within [0, 10].
    pub score: i32,
    pub signals: SignalHits,
}

/// Routing outcome. Terminal: assigned once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Lead,
    Review,
    Drop,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Lead => "lead",
            Classification::Review => "review",
            Classification::Drop => "drop",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored record with its routing decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: CandidateRecord,
    pub score: i32,
    pub signals: SignalHits,
    pub classification: Classification,
    /// True when an exclusion term forced `drop`.
    #[serde(default)]
    pub excluded: bool,
}

impl ClassifiedRecord {
    /// Ranking used for survivor selection and presentation:
    /// higher score first, then the lexicographically later timestamp.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| self.record.timestamp().cmp(other.record.timestamp()))
    }

    /// `true` if `self` should replace `existing` as a dedupe survivor.
    pub fn outranks(&self, existing: &Self) -> bool {
        self.rank_cmp(existing) == Ordering::Greater
    }
}
