//! # Sourcing Pipeline
//! Score → classify every record, set drops aside, dedupe leads and review
//! together, then partition survivors into buckets.
//!
//! Leads and review candidates are deduplicated as one pool so a lead can absorb
//! a near-duplicate review item (and vice versa). Drops never enter dedupe.
//! Buckets are presented by score desc, then most recent timestamp first.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analyze::{self, Deduplicator};
use crate::config::SignalConfig;
use crate::record::{CandidateRecord, Classification, ClassifiedRecord};
use crate::sink::LeadSink;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_records_total", "Records entering the pipeline.");
        describe_counter!("pipeline_leads_total", "Records routed to leads after dedupe.");
        describe_counter!("pipeline_review_total", "Records routed to review after dedupe.");
        describe_counter!("pipeline_dropped_total", "Records classified as drop.");
        describe_counter!(
            "pipeline_duplicates_total",
            "Records removed by deduplication."
        );
        describe_counter!("sink_failures_total", "Failed lead hand-offs to the sink.");
    });
}

/// Counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub dropped: usize,
    /// Subset of `dropped` forced by an exclusion term.
    pub excluded: usize,
    pub duplicates_removed: usize,
    pub leads: usize,
    pub review: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub leads: Vec<ClassifiedRecord>,
    pub review: Vec<ClassifiedRecord>,
    pub stats: BatchStats,
}

/// What happened to the leads bucket at the sink boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Delivery {
    /// No leads, nothing handed off.
    Skipped,
    Delivered { sink: String, count: usize },
    Failed { sink: String, reason: String },
}

/// Output plus delivery status. The output stays valid even if delivery failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub output: PipelineOutput,
    pub delivery: Delivery,
}

/// Immutable config + deduplicator. Cheap to share across tasks.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<SignalConfig>,
    dedup: Arc<Deduplicator>,
}

impl Pipeline {
    pub fn new(config: SignalConfig) -> Self {
        let dedup = Deduplicator::from_config(&config.dedupe);
        Self::with_deduplicator(Arc::new(config), dedup)
    }

    pub fn with_deduplicator(config: Arc<SignalConfig>, dedup: Deduplicator) -> Self {
        tracing::debug!(
            target: "pipeline",
            matcher = dedup.scorer_name(),
            threshold = dedup.threshold(),
            "pipeline ready"
        );
        Self {
            config,
            dedup: Arc::new(dedup),
        }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Score and classify one record, without dedupe.
    pub fn evaluate(&self, record: &CandidateRecord) -> ClassifiedRecord {
        analyze::evaluate(record, &self.config)
    }

    /// Run the full batch. Pure apart from logs/metrics.
    pub fn run(&self, batch: Vec<CandidateRecord>) -> PipelineOutput {
        ensure_metrics_described();

        let mut stats = BatchStats {
            total: batch.len(),
            ..Default::default()
        };

        let mut candidates = Vec::with_capacity(batch.len());
        for rec in &batch {
            let c = self.evaluate(rec);
            if c.classification == Classification::Drop {
                stats.dropped += 1;
                if c.excluded {
                    stats.excluded += 1;
                }
                tracing::debug!(
                    target: "pipeline",
                    id = %c.record.fingerprint(),
                    score = c.score,
                    excluded = c.excluded,
                    "dropped"
                );
                continue;
            }
            candidates.push(c);
        }

        let deduped = self.dedup.dedupe(candidates);
        stats.duplicates_removed = deduped.removed;

        let (mut leads, mut review): (Vec<_>, Vec<_>) = deduped
            .survivors
            .into_iter()
            .partition(|r| r.classification == Classification::Lead);
        sort_for_presentation(&mut leads);
        sort_for_presentation(&mut review);

        stats.leads = leads.len();
        stats.review = review.len();

        counter!("pipeline_records_total").increment(stats.total as u64);
        counter!("pipeline_leads_total").increment(stats.leads as u64);
        counter!("pipeline_review_total").increment(stats.review as u64);
        counter!("pipeline_dropped_total").increment(stats.dropped as u64);
        counter!("pipeline_duplicates_total").increment(stats.duplicates_removed as u64);

        tracing::info!(
            target: "pipeline",
            total = stats.total,
            leads = stats.leads,
            review = stats.review,
            dropped = stats.dropped,
            excluded = stats.excluded,
            duplicates = stats.duplicates_removed,
            "batch processed"
        );

        PipelineOutput {
            leads,
            review,
            stats,
        }
    }

    /// Run the batch and hand a non-empty leads bucket to `sink`.
    /// Sink errors are logged and reported, never propagated.
    pub async fn run_and_deliver(
        &self,
        batch: Vec<CandidateRecord>,
        sink: &dyn LeadSink,
    ) -> RunReport {
        let output = self.run(batch);
        let delivery = deliver(&output, sink).await;
        RunReport { output, delivery }
    }
}

/// Hand `output.leads` to the sink, unmodified.
pub async fn deliver(output: &PipelineOutput, sink: &dyn LeadSink) -> Delivery {
    if output.leads.is_empty() {
        return Delivery::Skipped;
    }
    match sink.deliver(&output.leads).await {
        Ok(()) => {
            tracing::info!(target: "sink", sink = sink.name(), count = output.leads.len(), "leads delivered");
            Delivery::Delivered {
                sink: sink.name().to_string(),
                count: output.leads.len(),
            }
        }
        Err(e) => {
            ensure_metrics_described();
            counter!("sink_failures_total").increment(1);
            tracing::warn!(target: "sink", sink = sink.name(), error = ?e, "lead delivery failed");
            Delivery::Failed {
                sink: sink.name().to_string(),
                reason: format!("{e:#}"),
            }
        }
    }
}

/// Score desc, then most recent timestamp first. Stable for full ties.
pub fn sort_for_presentation(records: &mut [ClassifiedRecord]) {
    records.sort_by(|a, b| b.rank_cmp(a));
}
