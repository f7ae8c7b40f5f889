//! Unified error model.
//!
//! Every failure surfaced to callers is one of these kinds. Components map
//! their internal failures into the taxonomy at the boundary; callers branch
//! on [`ErrorKind`] rather than string-matching messages.

use crate::invocation::ProviderId;
use crate::verdict::ComplianceVerdict;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Caller violated the request contract.
    #[error("REQUEST/{0}")]
    InvalidRequest(String),

    /// Daily quota ceiling reached; non-retriable until the day rolls over.
    #[error("QUOTA/{provider}: {reason}")]
    QuotaExceeded { provider: ProviderId, reason: String },

    /// Upstream failure worth retrying (network, 5xx, rate-limit).
    #[error("UPSTREAM/TRANSIENT/{provider}: {detail}")]
    UpstreamTransient { provider: ProviderId, detail: String },

    /// Upstream failure that will not improve on retry (auth, other 4xx).
    #[error("UPSTREAM/PERMANENT/{provider}: {detail}")]
    UpstreamPermanent { provider: ProviderId, detail: String },

    /// A template pool required by the chosen structure is empty.
    #[error("TEMPLATE/gap: {0}")]
    TemplateGap(String),

    /// Content cannot be made safe; the verdict carries the remediation list.
    #[error("COMPLIANCE/blocked: {}", .verdict.summary())]
    ComplianceBlocked { verdict: Box<ComplianceVerdict> },

    /// A deadline elapsed.
    #[error("TIMEOUT/{0}")]
    Timeout(String),

    /// The job was cancelled at a step boundary.
    #[error("CANCELLED/{0}")]
    Cancelled(String),

    /// Unexpected internal failure.
    #[error("INTERNAL/{0}")]
    Internal(String),
}

/// Discriminant of [`OrchestratorError`], used for branching and wire output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    QuotaExceeded,
    UpstreamTransient,
    UpstreamPermanent,
    TemplateGap,
    ComplianceBlocked,
    Timeout,
    Cancelled,
    Internal,
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::UpstreamTransient { .. } => ErrorKind::UpstreamTransient,
            Self::UpstreamPermanent { .. } => ErrorKind::UpstreamPermanent,
            Self::TemplateGap(_) => ErrorKind::TemplateGap,
            Self::ComplianceBlocked { .. } => ErrorKind::ComplianceBlocked,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the coordinator may retry the failed call.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::UpstreamTransient { .. })
    }

    /// Whether the coordinator should degrade to the template fallback
    /// instead of failing the job.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. } | Self::UpstreamPermanent { .. } | Self::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = OrchestratorError::InvalidRequest("missing seed".into());
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let err = OrchestratorError::QuotaExceeded {
            provider: ProviderId::Claude,
            reason: "calls".into(),
        };
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert!(!err.is_retriable());
        assert!(err.triggers_fallback());
    }

    #[test]
    fn test_only_transient_retries() {
        let transient = OrchestratorError::UpstreamTransient {
            provider: ProviderId::Heygen,
            detail: "503".into(),
        };
        let permanent = OrchestratorError::UpstreamPermanent {
            provider: ProviderId::Heygen,
            detail: "401".into(),
        };
        assert!(transient.is_retriable());
        assert!(!permanent.is_retriable());
        assert!(permanent.triggers_fallback());
    }

    #[test]
    fn test_display_carries_category() {
        let err = OrchestratorError::Timeout("video render".into());
        assert!(err.to_string().starts_with("TIMEOUT/"));
    }
}
