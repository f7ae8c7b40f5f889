//! Provider failure classification.
//!
//! Adapters surface transport-level failures as [`ProviderError`]; the
//! coordinator only cares about the [`FailureClass`], which decides retry
//! versus fallback.

use reelforge_core::{FailureClass, OrchestratorError, ProviderId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// 429, possibly with a Retry-After hint.
    #[error("rate limited{}", .retry_after_s.map(|s| format!(" (retry after {}s)", s)).unwrap_or_default())]
    RateLimited { retry_after_s: Option<u64> },

    /// Non-success HTTP status from the upstream.
    #[error("upstream status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Connection-level failure before any status was received.
    #[error("network: {0}")]
    Network(String),

    /// Credentials missing, expired, or rejected.
    #[error("auth: {0}")]
    Auth(String),

    /// The adapter's own deadline elapsed.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The upstream answered but the payload was unusable.
    #[error("bad payload: {0}")]
    BadPayload(String),
}

impl ProviderError {
    pub fn class(&self) -> FailureClass {
        match self {
            ProviderError::RateLimited { .. } | ProviderError::Network(_) => FailureClass::Transient,
            ProviderError::Status { status, .. } => classify_status(*status),
            ProviderError::Auth(_) | ProviderError::BadPayload(_) => FailureClass::Permanent,
            ProviderError::Timeout(_) => FailureClass::Timeout,
        }
    }

    /// Lift into the orchestrator taxonomy for a given provider.
    pub fn into_orchestrator(self, provider: ProviderId) -> OrchestratorError {
        let detail = self.to_string();
        match self.class() {
            FailureClass::Transient => OrchestratorError::UpstreamTransient { provider, detail },
            FailureClass::Timeout => OrchestratorError::Timeout(format!("{}: {}", provider, detail)),
            _ => OrchestratorError::UpstreamPermanent { provider, detail },
        }
    }
}

/// 429 and 5xx are worth retrying; other 4xx are not.
pub fn classify_status(status: u16) -> FailureClass {
    match status {
        429 => FailureClass::Transient,
        500..=599 => FailureClass::Transient,
        _ => FailureClass::Permanent,
    }
}
