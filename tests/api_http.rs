// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::path::Path;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use vc_lead_sourcing::api::{self, AppState};
use vc_lead_sourcing::{Pipeline, SignalConfig};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    let p = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/sourcing.toml");
    let cfg = SignalConfig::from_path(&p).expect("shipped config loads");
    api::router(AppState::new(Pipeline::new(cfg)))
}

async fn post_json(app: Router, uri: &str, payload: Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let resp = test_router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "OK");
}

#[tokio::test]
async fn api_score_classifies_one_record() {
    let (status, v) = post_json(
        test_router(),
        "/score",
        json!({ "title": "Startup post-revenue in Chile", "url": "http://example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["score"], 6);
    assert_eq!(v["classification"], "lead");
    assert_eq!(v["excluded"], false);
    assert_eq!(v["signals"]["geo"], true);
    assert_eq!(v["title"], "Startup post-revenue in Chile");
}

#[tokio::test]
async fn api_score_accepts_feed_style_aliases() {
    let (status, v) = post_json(
        test_router(),
        "/score",
        json!({ "title": "Weekly digest", "summary": "Post-revenue B2B startup", "link": "http://x" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["score"], 4);
    assert_eq!(v["classification"], "review");
    assert_eq!(v["url"], "http://x");
}

#[tokio::test]
async fn api_pipeline_returns_buckets_and_stats() {
    let batch = json!([
        { "title": "Startup post-revenue in Chile", "url": "http://a" },
        { "title": "Post-revenue startup expanding", "url": "http://b" },
        { "title": "Hackathon in Chile", "url": "http://c" },
        { "title": "Startup post-revenue in Chile", "url": "http://a" }
    ]);
    let (status, v) = post_json(test_router(), "/pipeline", batch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["leads"].as_array().map(Vec::len), Some(1));
    assert_eq!(v["review"].as_array().map(Vec::len), Some(1));
    assert_eq!(v["stats"]["total"], 4);
    assert_eq!(v["stats"]["dropped"], 1);
    assert_eq!(v["stats"]["excluded"], 1);
    assert_eq!(v["stats"]["duplicates_removed"], 1);
}

#[tokio::test]
async fn api_pipeline_rejects_non_array() {
    let (status, _) = post_json(test_router(), "/pipeline", json!({ "title": "x" })).await;
    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn api_score_rejects_record_without_title() {
    let (status, _) = post_json(test_router(), "/score", json!({ "snippet": "no title" })).await;
    assert!(status.is_client_error(), "got {status}");
}
