// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::collections::HashSet;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime, UtcOffset,
};

use crate::ingest::normalize_text;
use crate::ingest::types::SourceProvider;
use crate::record::CandidateRecord;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// RFC 2822 `pubDate` → RFC 3339 UTC; unparseable dates are kept verbatim.
fn published_to_iso(ts: &str) -> String {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(|dt| dt.to_offset(UtcOffset::UTC).format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.trim().to_string())
}

/// RSS feeds as candidate records. Links are unique across all feeds of one provider.
pub struct RssProvider {
    mode: Mode,
}

enum Mode {
    Fixture(Vec<String>),
    Http {
        urls: Vec<String>,
        client: reqwest::Client,
    },
}

impl RssProvider {
    pub fn from_urls(urls: Vec<String>) -> Self {
        Self {
            mode: Mode::Http {
                urls,
                client: reqwest::Client::new(),
            },
        }
    }

    /// Parse already-downloaded feed documents (tests, offline runs).
    pub fn from_fixture_str(xml: &str) -> Self {
        Self::from_fixtures(vec![xml.to_string()])
    }

    pub fn from_fixtures(docs: Vec<String>) -> Self {
        Self {
            mode: Mode::Fixture(docs),
        }
    }

    /// Parse one feed document, skipping items without a link or with a link in `seen`.
    fn parse_feed(xml: &str, seen: &mut HashSet<String>) -> Result<Vec<CandidateRecord>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
        let source_title = rss
            .channel
            .title
            .as_deref()
            .map(normalize_text)
            .unwrap_or_default();

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let Some(link) = it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())
            else {
                continue;
            };
            if !seen.insert(link.clone()) {
                continue;
            }

            let mut rec = CandidateRecord::new(
                normalize_text(it.title.as_deref().unwrap_or_default()),
                normalize_text(it.description.as_deref().unwrap_or_default()),
            )
            .with_url(link);
            rec.timestamp = it.pub_date.as_deref().map(published_to_iso);
            if !source_title.is_empty() {
                rec.source = Some(source_title.clone());
            }
            out.push(rec);
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        Ok(out)
    }

    fn parse_all<'a>(docs: impl IntoIterator<Item = &'a str>) -> Result<Vec<CandidateRecord>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for doc in docs {
            out.extend(Self::parse_feed(doc, &mut seen)?);
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateRecord>> {
        match &self.mode {
            Mode::Fixture(docs) => Self::parse_all(docs.iter().map(String::as_str)),
            Mode::Http { urls, client } => {
                let mut seen = HashSet::new();
                let mut out = Vec::new();
                for url in urls {
                    let body = match fetch_text(client, url).await {
                        Ok(b) => b,
                        Err(e) => {
                            tracing::warn!(target: "ingest", error = ?e, feed = %url, "feed fetch failed");
                            counter!("ingest_provider_errors_total").increment(1);
                            continue;
                        }
                    };
                    match Self::parse_feed(&body, &mut seen) {
                        Ok(v) => out.extend(v),
                        Err(e) => {
                            tracing::warn!(target: "ingest", error = ?e, feed = %url, "feed parse failed");
                            counter!("ingest_provider_errors_total").increment(1);
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    client
        .get(url)
        .send()
        .await
        .context("rss http get()")?
        .error_for_status()
        .context("rss non-2xx")?
        .text()
        .await
        .context("rss http .text()")
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
