//! Reelforge API: orchestrator facade and REST endpoints.

pub mod config;
pub mod facade;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod payload;

pub use config::ApiConfig;
pub use facade::Orchestrator;
pub use metrics::Metrics;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub metrics: Arc<Metrics>,
}

pub fn create_app(orchestrator: Arc<Orchestrator>) -> Router {
    let cors = middleware::cors(&orchestrator.config().allowed_origins);
    let state = AppState { orchestrator, metrics: Arc::new(Metrics::new()) };
    Router::new()
        .route(
            "/content/generate",
            post(handlers::generate_content).get(handlers::capabilities),
        )
        .route("/reddit/scrape", post(handlers::scrape_reddit))
        .route("/video/generate", post(handlers::generate_video))
        .route("/video/status/{job_id}", get(handlers::video_status))
        .route("/video/cancel/{job_id}", post(handlers::cancel_job))
        .route("/usage/stats", get(handlers::usage_stats))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_text))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run(config: ApiConfig) {
    let addr = config.addr.clone();
    let orchestrator = Arc::new(Orchestrator::new(config));
    let app = create_app(orchestrator);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    tracing::info!("reelforge API listening on {}", addr);
    axum::serve(listener, app).await.expect("server error");
}
