//! Binary entrypoint for the Reelforge API server.

use reelforge_api::{run, ApiConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    run(ApiConfig::from_env()).await;
}
