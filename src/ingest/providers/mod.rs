// src/ingest/providers/mod.rs
pub mod cse;
pub mod rss;

pub use cse::CseProvider;
pub use rss::RssProvider;
