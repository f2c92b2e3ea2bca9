// src/config/schema.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ConfigError;

fn default_min_score_to_append() -> i32 {
    4
}
fn default_min_score_to_review() -> i32 {
    2
}
fn default_dedupe_threshold() -> i64 {
    90
}
fn default_max_results_per_query() -> usize {
    10
}
fn default_csv_path() -> String {
    "data/new_rows.csv".to_string()
}

/// A keyword category: any keyword present adds `weight` once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSignal {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub weight: i32,
}

/// Geography: countries/regions plus optional per-country aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoSignal {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub weight: i32,
    /// Country → alternative spellings (e.g. "Brazil" → ["Brasil"]).
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl GeoSignal {
    /// Every term that counts as a geo mention: countries and their aliases.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.countries
            .iter()
            .map(String::as_str)
            .chain(self.aliases.values().flatten().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Weights {
    pub geo: GeoSignal,
    pub post_revenue: KeywordSignal,
    pub enterprise: KeywordSignal,
    pub fintech_penalty: KeywordSignal,
    /// Additional keyword categories, keyed by name.
    pub extra: BTreeMap<String, KeywordSignal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    #[default]
    Fuzzy,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupeConfig {
    /// Similarity threshold on a 0–100 scale.
    pub threshold: u8,
    pub matcher: MatcherKind,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            threshold: 90,
            matcher: MatcherKind::Fuzzy,
        }
    }
}

/// Where the sourcing run pulls candidates from. Not used by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub rss_feeds: Vec<String>,
    #[serde(default)]
    pub cse_queries: Vec<String>,
    #[serde(default = "default_max_results_per_query")]
    pub max_results_per_query: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            rss_feeds: Vec::new(),
            cse_queries: Vec::new(),
            max_results_per_query: default_max_results_per_query(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

/// Validated, immutable configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalConfig {
    pub weights: Weights,
    pub exclude_terms: Vec<String>,
    pub min_score_to_append: i32,
    pub min_score_to_review: i32,
    pub dedupe: DedupeConfig,
    pub sources: SourcesConfig,
    pub output: OutputConfig,
}

/* ----------------------------
Raw (unvalidated) file shape
---------------------------- */

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    weights: RawWeights,
    #[serde(default)]
    exclude_terms: Vec<String>,
    #[serde(default = "default_min_score_to_append")]
    min_score_to_append: i32,
    #[serde(default = "default_min_score_to_review")]
    min_score_to_review: i32,
    #[serde(default)]
    dedupe: RawDedupe,
    #[serde(default)]
    sources: SourcesConfig,
    #[serde(default)]
    output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawWeights {
    geo: Option<GeoSignal>,
    post_revenue: Option<KeywordSignal>,
    enterprise: Option<KeywordSignal>,
    fintech_penalty: Option<KeywordSignal>,
    #[serde(flatten)]
    extra: BTreeMap<String, KeywordSignal>,
}

#[derive(Debug, Deserialize)]
struct RawDedupe {
    #[serde(default = "default_dedupe_threshold")]
    threshold: i64,
    #[serde(default)]
    matcher: MatcherKind,
}

impl Default for RawDedupe {
    fn default() -> Self {
        Self {
            threshold: default_dedupe_threshold(),
            matcher: MatcherKind::default(),
        }
    }
}

pub(super) fn parse_toml(s: &str, origin: &str) -> Result<SignalConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(s).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;
    validate(raw)
}

pub(super) fn parse_json(s: &str, origin: &str) -> Result<SignalConfig, ConfigError> {
    let raw: RawConfig = serde_json::from_str(s).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;
    validate(raw)
}

fn validate(raw: RawConfig) -> Result<SignalConfig, ConfigError> {
    let w = raw.weights;
    let mut geo = w.geo.ok_or(ConfigError::MissingCategory("geo"))?;
    let post_revenue = w
        .post_revenue
        .ok_or(ConfigError::MissingCategory("post_revenue"))?;
    let enterprise = w
        .enterprise
        .ok_or(ConfigError::MissingCategory("enterprise"))?;
    let fintech_penalty = w
        .fintech_penalty
        .ok_or(ConfigError::MissingCategory("fintech_penalty"))?;

    if !(0..=100).contains(&raw.dedupe.threshold) {
        return Err(ConfigError::OutOfRange {
            name: "dedupe.threshold",
            value: raw.dedupe.threshold,
            min: 0,
            max: 100,
        });
    }

    if raw.min_score_to_review > raw.min_score_to_append {
        tracing::warn!(
            target: "config",
            min_score_to_review = raw.min_score_to_review,
            min_score_to_append = raw.min_score_to_append,
            "review threshold above append threshold; corroborated leads below it go to review"
        );
    }

    geo.countries = clean_terms(geo.countries);
    geo.aliases = geo
        .aliases
        .into_iter()
        .map(|(k, v)| (k, clean_terms(v)))
        .collect();

    Ok(SignalConfig {
        weights: Weights {
            geo,
            post_revenue: clean_signal(post_revenue),
            enterprise: clean_signal(enterprise),
            fintech_penalty: clean_signal(fintech_penalty),
            extra: w
                .extra
                .into_iter()
                .map(|(k, v)| (k, clean_signal(v)))
                .collect(),
        },
        exclude_terms: clean_terms(raw.exclude_terms),
        min_score_to_append: raw.min_score_to_append,
        min_score_to_review: raw.min_score_to_review,
        dedupe: DedupeConfig {
            threshold: raw.dedupe.threshold as u8,
            matcher: raw.dedupe.matcher,
        },
        sources: SourcesConfig {
            rss_feeds: clean_terms(raw.sources.rss_feeds),
            cse_queries: clean_terms(raw.sources.cse_queries),
            max_results_per_query: raw.sources.max_results_per_query,
        },
        output: raw.output,
    })
}

fn clean_signal(mut s: KeywordSignal) -> KeywordSignal {
    s.keywords = clean_terms(s.keywords);
    s
}

/// Trim, drop empties and exact repeats; order is kept.
fn clean_terms(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_terms_trims_and_dedups() {
        let v = clean_terms(vec![" Chile ".into(), "".into(), "Chile".into(), "Peru".into()]);
        assert_eq!(v, vec!["Chile".to_string(), "Peru".to_string()]);
    }

    #[test]
    fn geo_terms_include_aliases() {
        let mut aliases = BTreeMap::new();
        aliases.insert("Brazil".to_string(), vec!["Brasil".to_string()]);
        let geo = GeoSignal {
            countries: vec!["Brazil".into()],
            weight: 3,
            aliases,
        };
        let terms: Vec<&str> = geo.terms().collect();
        assert_eq!(terms, vec!["Brazil", "Brasil"]);
    }
}
