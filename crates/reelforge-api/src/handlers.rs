//! HTTP handlers.
//!
//! Every endpoint returns `{ success, ... }`. Accepted requests answer 2xx,
//! including planned fallbacks and quota degradation; request-shape
//! problems answer 4xx; 5xx is reserved for unrecoverable internal errors.

use crate::payload::{ContentGenerateBody, ScrapeBody, VideoGenerateBody, SCRAPE_CATEGORIES};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use reelforge_core::{
    ErrorKind, GenerationMethod, OrchestratorError, ProviderId, REELFORGE_VERSION,
};
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn generate_content(
    State(state): State<AppState>,
    Json(body): Json<ContentGenerateBody>,
) -> (StatusCode, Json<Value>) {
    state.metrics.requests.inc();
    let use_real_data = body.use_real_data.unwrap_or(false);
    let mut request = body.into_request();

    let mut market_used = false;
    if use_real_data {
        if let Some(signals) = state.orchestrator.market_signals(&request.seed.title).await {
            // Enrichment never clears a disclosure obligation.
            let affiliate = request.seed.signals.affiliate_link || signals.affiliate_link;
            request.seed.signals = signals;
            request.seed.signals.affiliate_link = affiliate;
            market_used = true;
        }
    }

    let seed = request.seed.clone();
    state.metrics.jobs_submitted.inc();
    match state.orchestrator.generate(request).await {
        Ok(artifact) => {
            let degraded = artifact.generation_method == GenerationMethod::Fallback;
            if degraded {
                state.metrics.fallbacks.inc();
            }
            let hooks = state.orchestrator.hook_alternatives(&seed, 8);
            let mut response = json!({
                "success": true,
                "content": {
                    "script": artifact.script.full_text(),
                    "segments": artifact.script.segments,
                    "hooks": hooks,
                    "hashtags": artifact.script.hashtags,
                    "postingTips": artifact.posting.tips,
                    "businessRationale": artifact.rationale,
                    "caption": artifact.posting.caption,
                    "postingTimeHint": artifact.posting.posting_time_hint,
                    "viralScore": artifact.script.viral_score,
                    "estimatedDurationS": artifact.script.estimated_duration_s,
                },
                "artifact_id": artifact.artifact_id,
                "strategy": artifact.strategy.tag(),
                "media": artifact.media,
                "cost": artifact.cost,
                "dataSource": data_source(&state, artifact.generation_method, market_used),
            });
            if degraded {
                response["degraded"] = json!(true);
                response["reason"] = json!(artifact
                    .fallback_reason
                    .clone()
                    .unwrap_or_else(|| "fallback".to_string()));
            }
            (StatusCode::OK, Json(response))
        }
        Err(err) => {
            if err.kind() == ErrorKind::ComplianceBlocked {
                state.metrics.compliance_blocks.inc();
            }
            error_response(&err)
        }
    }
}

pub async fn capabilities(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    state.metrics.requests.inc();
    let config = state.orchestrator.config();
    let environment: Value = ProviderId::all()
        .iter()
        .map(|&p| {
            (
                format!("{}_configured", p.as_str()),
                json!(config.is_configured(p)),
            )
        })
        .collect::<serde_json::Map<String, Value>>()
        .into();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "status": "ok",
            "version": REELFORGE_VERSION,
            "features": [
                "strategy-routing",
                "script-composition",
                "quota-governance",
                "compliance-audit",
                "shadowban-monitoring",
                "artifact-cache",
                "async-jobs",
            ],
            "environment": environment,
            // No fact-check collaborator is wired in this build; the stage
            // reports unavailable rather than fabricating signals.
            "fact_check": if config.fact_check_enabled { "unavailable" } else { "disabled" },
        })),
    )
}

pub async fn scrape_reddit(
    State(state): State<AppState>,
    Json(body): Json<ScrapeBody>,
) -> (StatusCode, Json<Value>) {
    state.metrics.requests.inc();
    if !SCRAPE_CATEGORIES.contains(&body.category.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "invalid_request",
                "detail": format!(
                    "unknown category '{}'; expected one of {:?}",
                    body.category, SCRAPE_CATEGORIES
                ),
            })),
        );
    }
    let limit = body.limit.clamp(1, 25);
    match state.orchestrator.scrape_stories(&body.category, limit).await {
        Ok((stories, connected)) => {
            let count = stories.len();
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "stories": stories,
                    "category": body.category,
                    "count": count,
                    "source": if connected { "reddit" } else { "builtin" },
                })),
            )
        }
        Err(err) => error_response(&err),
    }
}

pub async fn generate_video(
    State(state): State<AppState>,
    Json(body): Json<VideoGenerateBody>,
) -> (StatusCode, Json<Value>) {
    state.metrics.requests.inc();
    let request = body.into_request();
    let estimated_duration_s = 60.0 + request.target_duration_s * 2.0;
    match state.orchestrator.submit(request) {
        Ok(job_id) => {
            state.metrics.jobs_submitted.inc();
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "jobId": job_id,
                    "estimated_duration": estimated_duration_s,
                })),
            )
        }
        Err(err) => error_response(&err),
    }
}

pub async fn video_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> (StatusCode, Json<Value>) {
    state.metrics.requests.inc();
    match state.orchestrator.status(job_id) {
        Some(job) => {
            let artifact = state.orchestrator.artifact_for(&job);
            let mut response = json!({ "success": true, "job": job });
            if let Some(artifact) = artifact {
                response["artifact"] = serde_json::to_value(artifact.as_ref())
                    .unwrap_or(Value::Null);
            }
            (StatusCode::OK, Json(response))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": "invalid_request",
                "detail": format!("unknown job {}", job_id),
            })),
        ),
    }
}

pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> (StatusCode, Json<Value>) {
    state.metrics.requests.inc();
    let cancelled = state.orchestrator.cancel(job_id);
    (
        StatusCode::OK,
        Json(json!({ "success": cancelled, "jobId": job_id })),
    )
}

pub async fn usage_stats(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    state.metrics.requests.inc();
    let snapshot = state.orchestrator.usage();
    let providers: serde_json::Map<String, Value> = snapshot
        .providers
        .iter()
        .map(|(provider, usage)| {
            (
                provider.as_str().to_string(),
                json!({
                    "calls": usage.calls,
                    "cost": usage.cost_usd,
                    "tokens": usage.tokens,
                    "in_flight": usage.in_flight,
                    "limits": {
                        "max_calls": usage.limits.max_calls,
                        "max_cost": usage.limits.max_cost_usd,
                        "max_tokens": usage.limits.max_tokens,
                        "max_concurrent": usage.limits.max_concurrent,
                    },
                    "utilization": usage.utilization,
                }),
            )
        })
        .collect();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "providers": providers,
            "total_cost_today": snapshot.total_cost_today_usd,
            "budget_status": {
                "percentUsed": snapshot.budget.percent_used,
                "status": snapshot.budget.status,
            },
        })),
    )
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": REELFORGE_VERSION })),
    )
}

pub async fn metrics_text(State(state): State<AppState>) -> String {
    state.metrics.encode()
}

/// Provider-connectivity flags plus how the content was produced.
fn data_source(state: &AppState, method: GenerationMethod, market_used: bool) -> Value {
    let config = state.orchestrator.config();
    json!({
        "claude_connected": config.is_configured(ProviderId::Claude),
        "heygen_connected": config.is_configured(ProviderId::Heygen),
        "arcads_connected": config.is_configured(ProviderId::Arcads),
        "shotstack_connected": config.is_configured(ProviderId::Shotstack),
        "elevenlabs_connected": config.is_configured(ProviderId::Elevenlabs),
        "reddit_connected": config.is_configured(ProviderId::Reddit),
        "fastmoss_connected": config.is_configured(ProviderId::Fastmoss),
        "kalodata_connected": config.is_configured(ProviderId::Kalodata),
        "used_real_data": market_used,
        "generation_method": method,
    })
}

/// Map the error taxonomy onto the HTTP contract.
fn error_response(err: &OrchestratorError) -> (StatusCode, Json<Value>) {
    let kind = err.kind();
    let mut body = json!({
        "success": false,
        "error": kind,
        "detail": err.to_string(),
    });
    let status = match err {
        OrchestratorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        OrchestratorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        OrchestratorError::ComplianceBlocked { verdict } => {
            body["recommendations"] = json!(verdict.recommendations());
            body["issues"] = json!(verdict.issues);
            StatusCode::OK
        }
        // Quota, upstream, timeout, cancelled, template gaps: the request
        // was well-formed and the outcome is describable.
        _ => StatusCode::OK,
    };
    (status, Json(body))
}
