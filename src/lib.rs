// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod record;
pub mod sink;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::{ConfigError, SignalConfig};
pub use crate::notify::{NotifierMux, RunSummary};
pub use crate::pipeline::{BatchStats, Delivery, Pipeline, PipelineOutput, RunReport};
pub use crate::record::{CandidateRecord, Classification, ClassifiedRecord, ScoredRecord, SignalHits};
pub use crate::sink::{CsvFileSink, LeadSink};
