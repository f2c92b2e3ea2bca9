// src/api.rs
//! HTTP surface: score single records or whole batches without touching a sink.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::metrics::Metrics;
use crate::pipeline::{Pipeline, PipelineOutput};
use crate::record::{CandidateRecord, ClassifiedRecord};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Routes without `/metrics` (tests, embedding).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score))
        .route("/pipeline", post(run_pipeline))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Routes plus `/metrics` when a Prometheus handle is installed.
pub fn router_with_metrics(state: AppState, metrics: Option<&Metrics>) -> Router {
    match metrics {
        Some(m) => router(state).merge(m.router()),
        None => router(state),
    }
}

async fn score(
    State(state): State<AppState>,
    Json(record): Json<CandidateRecord>,
) -> Json<ClassifiedRecord> {
    let out = state.pipeline.evaluate(&record);
    tracing::debug!(
        target: "pipeline",
        id = %record.fingerprint(),
        score = out.score,
        class = %out.classification,
        "scored via api"
    );
    Json(out)
}

async fn run_pipeline(
    State(state): State<AppState>,
    Json(batch): Json<Vec<CandidateRecord>>,
) -> Json<PipelineOutput> {
    Json(state.pipeline.run(batch))
}
