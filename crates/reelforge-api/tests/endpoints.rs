//! Endpoint tests against the full in-process stack.
//!
//! Each test drives the axum router directly with `oneshot`, exercising the
//! documented scenarios: credential-less fallback, quota degradation,
//! compliance blocking, and the async video job flow.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use reelforge_api::{create_app, ApiConfig, Orchestrator};
use reelforge_core::ProviderId;
use reelforge_governor::QuotaLimits;
use reelforge_jobs::CoordinatorConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(config: ApiConfig) -> Router {
    create_app(Arc::new(Orchestrator::with_timings(config, CoordinatorConfig::fast())))
}

async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// Fallback with no credentials
// =============================================================================

#[tokio::test]
async fn test_generate_without_keys_falls_back() {
    let app = app_with(ApiConfig::bare());
    let (status, body) = post_json(
        &app,
        "/content/generate",
        json!({
            "contentType": "viral-affiliate",
            "targetProduct": "LED Strip Lights",
            "variationSeed": 7,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(!body["content"]["script"].as_str().unwrap().is_empty());
    assert_eq!(body["dataSource"]["generation_method"], json!("fallback"));
    assert_eq!(body["dataSource"]["fastmoss_connected"], json!(false));
    assert!(body["content"]["hooks"].as_array().unwrap().len() >= 5);

    // No provider calls were counted anywhere.
    let (status, usage) = get_json(&app, "/usage/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(usage["total_cost_today"], json!(0.0));
    for (_, provider) in usage["providers"].as_object().unwrap() {
        assert_eq!(provider["calls"], json!(0));
    }
}

// =============================================================================
// Quota exhaustion degrades gracefully
// =============================================================================

#[tokio::test]
async fn test_generate_over_quota_degrades() {
    let mut config = ApiConfig::bare();
    config.configured.insert(ProviderId::Claude, true);
    config.governor = config
        .governor
        .clone()
        .with_limit(ProviderId::Claude, QuotaLimits::new(0, 5.0, 500_000, 4));
    let app = app_with(config);

    let (status, body) = post_json(
        &app,
        "/content/generate",
        json!({ "contentType": "viral-growth-conspiracy" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["dataSource"]["generation_method"], json!("fallback"));
    assert_eq!(body["degraded"], json!(true));
    assert_eq!(body["reason"], json!("quota_exceeded"));

    let (_, usage) = get_json(&app, "/usage/stats").await;
    assert_eq!(usage["providers"]["claude"]["calls"], json!(0));
}

// =============================================================================
// Compliance blocks a dangerous claim
// =============================================================================

#[tokio::test]
async fn test_generate_blocks_dangerous_claim() {
    let app = app_with(ApiConfig::full());
    let (status, body) = post_json(
        &app,
        "/content/generate",
        json!({
            "contentType": "viral-supplement",
            "targetProduct": "Mushroom blend",
            "content": "This blend cures cancer according to my cousin",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("compliance_blocked"));
    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(recommendations.iter().any(|r| r.as_str().unwrap().contains("may support")));
    assert!(recommendations.iter().any(|r| r.as_str().unwrap().contains("disclaimer")));

    // Blocked before any paid call.
    let (_, usage) = get_json(&app, "/usage/stats").await;
    assert_eq!(usage["total_cost_today"], json!(0.0));
}

// =============================================================================
// Capability discovery and health
// =============================================================================

#[tokio::test]
async fn test_capability_discovery_reports_configuration() {
    let app = app_with(ApiConfig::bare());
    let (status, body) = get_json(&app, "/content/generate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["environment"]["claude_configured"], json!(false));
    assert!(body["features"].as_array().unwrap().len() >= 5);

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

// =============================================================================
// Reddit scraping
// =============================================================================

#[tokio::test]
async fn test_scrape_known_category() {
    let app = app_with(ApiConfig::bare());
    let (status, body) = post_json(
        &app,
        "/reddit/scrape",
        json!({ "category": "drama", "limit": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["count"], json!(3));
    assert_eq!(body["source"], json!("builtin"));
}

#[tokio::test]
async fn test_scrape_unknown_category_is_rejected() {
    let app = app_with(ApiConfig::bare());
    let (status, body) = post_json(
        &app,
        "/reddit/scrape",
        json!({ "category": "celebrity-gossip" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

// =============================================================================
// Async video jobs
// =============================================================================

#[tokio::test]
async fn test_video_job_lifecycle() {
    let app = app_with(ApiConfig::bare());
    let (status, body) = post_json(
        &app,
        "/video/generate",
        json!({
            "story": {
                "id": "mill-night",
                "content": "Security cameras kept picking up movement on a sealed floor.",
                "category": "horror",
            },
            "video_config": { "duration": 30.0, "add_captions": true },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let job_id = body["jobId"].as_str().unwrap().to_string();
    assert!(body["estimated_duration"].as_f64().unwrap() > 0.0);

    // Poll until terminal; the fake-free pipeline finishes in milliseconds.
    let mut last = Value::Null;
    for _ in 0..200 {
        let (status, body) = get_json(&app, &format!("/video/status/{}", job_id)).await;
        assert_eq!(status, StatusCode::OK);
        let job_status = body["job"]["status"].as_str().unwrap().to_string();
        last = body;
        if ["done", "failed", "cancelled"].contains(&job_status.as_str()) {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert_eq!(last["job"]["status"], json!("done"), "{}", last);
    assert_eq!(last["job"]["percent"], json!(100));
    assert!(last["artifact"].is_object());
    assert_eq!(last["artifact"]["generation_method"], json!("fallback"));
}

#[tokio::test]
async fn test_video_status_unknown_job_404s() {
    let app = app_with(ApiConfig::bare());
    let (status, body) = get_json(
        &app,
        "/video/status/00000000-0000-0000-0000-000000000000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

// =============================================================================
// Usage stats shape
// =============================================================================

#[tokio::test]
async fn test_usage_stats_shape() {
    let app = app_with(ApiConfig::bare());
    let (status, body) = get_json(&app, "/usage/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["budget_status"]["status"], json!("ok"));
    let claude = &body["providers"]["claude"];
    assert!(claude["limits"]["max_calls"].as_u64().unwrap() > 0);
    assert_eq!(claude["utilization"], json!(0.0));
}
