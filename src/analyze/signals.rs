//! Signal matcher: case-insensitive raw substring checks over record text.
//!
//! Matching is deliberately naive: no tokenization and no word boundaries, so
//! "Peru" also fires inside "Perugia". A category is either present or not.

use crate::config::{GeoSignal, SignalConfig};
use crate::record::{CandidateRecord, SignalHits};

/// Lowercased text, `None` → empty.
fn lower(text: Option<&str>) -> String {
    text.map(str::to_lowercase).unwrap_or_default()
}

/// Space-joined lowercase text of the non-empty parts.
pub fn combine_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `true` if ANY term occurs in `text`. Empty terms never match.
pub fn contains_any<S: AsRef<str>>(text: &str, terms: &[S]) -> bool {
    let haystack = text.to_lowercase();
    contains_any_lower(&haystack, terms.iter().map(AsRef::as_ref))
}

fn contains_any_lower<'a>(haystack: &str, terms: impl IntoIterator<Item = &'a str>) -> bool {
    terms.into_iter().any(|t| {
        let t = t.trim();
        !t.is_empty() && haystack.contains(t.to_lowercase().as_str())
    })
}

/// Geo check across several parts (typically title, snippet, url).
pub fn matches_geo<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, geo: &GeoSignal) -> bool {
    let combined = combine_parts(parts);
    contains_any_lower(&combined, geo.terms())
}

/// Exclusion is checked against title + snippet only (never the URL).
pub fn is_excluded<S: AsRef<str>>(title: &str, snippet: &str, terms: &[S]) -> bool {
    let text = format!("{} {}", lower(Some(title)), lower(Some(snippet)));
    contains_any_lower(&text, terms.iter().map(AsRef::as_ref))
}

/// Evaluate every configured category for one record.
pub fn detect(record: &CandidateRecord, cfg: &SignalConfig) -> SignalHits {
    let parts = [
        Some(record.title.as_str()),
        Some(record.snippet.as_str()),
        record.url.as_deref(),
    ];
    let combined = combine_parts(parts);
    let w = &cfg.weights;

    let hit = |keywords: &[String]| contains_any_lower(&combined, keywords.iter().map(String::as_str));

    SignalHits {
        geo: contains_any_lower(&combined, w.geo.terms()),
        post_revenue: hit(&w.post_revenue.keywords),
        enterprise: hit(&w.enterprise.keywords),
        fintech_penalty: hit(&w.fintech_penalty.keywords),
        extra: w
            .extra
            .iter()
            .filter(|(_, sig)| hit(&sig.keywords))
            .map(|(name, _)| name.clone())
            .collect(),
    }
}
