// src/config/mod.rs
//! Signal configuration: weights, exclusion terms, routing thresholds and dedupe settings.
//!
//! TOML shape (JSON with the same keys is accepted too):
//! ```toml
//! min_score_to_append = 4
//! min_score_to_review = 2
//! exclude_terms = ["idea stage", "pre-revenue"]
//!
//! [weights.geo]
//! countries = ["Chile", "Brazil"]
//! weight = 3
//! aliases = { Brazil = ["Brasil"] }
//!
//! [weights.post_revenue]
//! keywords = ["post-revenue"]
//! weight = 3
//!
//! [weights.enterprise]      # required
//! [weights.fintech_penalty] # required, weight usually negative
//! [weights.female]          # any further table is an extra keyword category
//!
//! [dedupe]
//! threshold = 90
//! matcher = "fuzzy"         # or "exact"
//! ```
//!
//! The config is validated once at load and never mutated afterwards.

mod schema;

pub use schema::{
    DedupeConfig, GeoSignal, KeywordSignal, MatcherKind, OutputConfig, SignalConfig,
    SourcesConfig, Weights,
};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_CONFIG_PATH: &str = "SOURCING_CONFIG_PATH";
pub const DEFAULT_CONFIG_TOML: &str = "config/sourcing.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/sourcing.json";

/// Fatal configuration problems. Surfaced before any record is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("missing required signal category `weights.{0}`")]
    MissingCategory(&'static str),
    #[error("`{name}` = {value} is out of range {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("no config found ({0})")]
    NotFound(String),
}

impl SignalConfig {
    /// Load from an explicit path. `.toml` / `.json` by extension, otherwise TOML then JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let origin = path.display().to_string();
        match ext.as_str() {
            "toml" => schema::parse_toml(&content, &origin),
            "json" => schema::parse_json(&content, &origin),
            _ => schema::parse_toml(&content, &origin)
                .or_else(|_| schema::parse_json(&content, &origin)),
        }
    }

    /// Resolve the config path:
    /// 1) $SOURCING_CONFIG_PATH (must exist)
    /// 2) config/sourcing.toml
    /// 3) config/sourcing.json
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_path(&resolve_default_path()?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        schema::parse_toml(s, "<toml>")
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        schema::parse_json(s, "<json>")
    }
}

/// Path `load_default` would read, without reading it.
pub fn resolve_default_path() -> Result<PathBuf, ConfigError> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(pb);
        }
        return Err(ConfigError::NotFound(format!(
            "{ENV_CONFIG_PATH} points to non-existent path {}",
            pb.display()
        )));
    }
    for candidate in [DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_JSON] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(pb);
        }
    }
    Err(ConfigError::NotFound(format!(
        "tried {DEFAULT_CONFIG_TOML} and {DEFAULT_CONFIG_JSON}"
    )))
}
