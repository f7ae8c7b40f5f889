//! Provider identities and invocation records.

use serde::{Deserialize, Serialize};

/// External providers the orchestrator can commission work from.
///
/// The concrete API clients live behind adapter traits; this enum is only
/// the identity used by quota ledgers, routing, and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// LLM script enhancement.
    Claude,
    /// Human-avatar video.
    Heygen,
    /// UGC-style actor video.
    Arcads,
    /// Template-driven render.
    Shotstack,
    /// Voice synthesis.
    Elevenlabs,
    /// Story scraping.
    Reddit,
    /// Product market data.
    Fastmoss,
    /// Category market data.
    Kalodata,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Claude => "claude",
            ProviderId::Heygen => "heygen",
            ProviderId::Arcads => "arcads",
            ProviderId::Shotstack => "shotstack",
            ProviderId::Elevenlabs => "elevenlabs",
            ProviderId::Reddit => "reddit",
            ProviderId::Fastmoss => "fastmoss",
            ProviderId::Kalodata => "kalodata",
        }
    }

    /// All providers, in stable priority order (used for tie-breaks).
    pub fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Claude,
            ProviderId::Heygen,
            ProviderId::Arcads,
            ProviderId::Shotstack,
            ProviderId::Elevenlabs,
            ProviderId::Reddit,
            ProviderId::Fastmoss,
            ProviderId::Kalodata,
        ]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single guarded provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Admitted,
    RejectedQuota,
    Running,
    Ok,
    Failed,
}

/// Why a call failed, for retry policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Transient,
    Permanent,
    Timeout,
    Cancelled,
}

/// Record of one admitted (or rejected) provider call attached to a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInvocation {
    pub provider: ProviderId,
    pub operation: String,
    pub estimated_cost_usd: f64,
    pub estimated_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_tokens: Option<u64>,
    pub status: InvocationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_class: Option<FailureClass>,
    /// 1-based attempt number; retries append fresh records.
    pub attempt: u32,
}

impl ProviderInvocation {
    pub fn new(provider: ProviderId, operation: impl Into<String>) -> Self {
        Self {
            provider,
            operation: operation.into(),
            estimated_cost_usd: 0.0,
            estimated_tokens: 0,
            actual_cost_usd: None,
            actual_tokens: None,
            status: InvocationStatus::Admitted,
            failure_class: None,
            attempt: 1,
        }
    }

    pub fn with_estimate(mut self, cost_usd: f64, tokens: u64) -> Self {
        self.estimated_cost_usd = cost_usd;
        self.estimated_tokens = tokens;
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// Fold in actuals after a successful completion.
    pub fn completed(mut self, cost_usd: f64, tokens: u64) -> Self {
        self.actual_cost_usd = Some(cost_usd);
        self.actual_tokens = Some(tokens);
        self.status = InvocationStatus::Ok;
        self
    }

    pub fn failed(mut self, class: FailureClass) -> Self {
        self.status = InvocationStatus::Failed;
        self.failure_class = Some(class);
        self
    }

    pub fn rejected(mut self) -> Self {
        self.status = InvocationStatus::RejectedQuota;
        self
    }

    /// Cost that actually materialized (zero for rejected or failed calls
    /// with no partial spend recorded).
    pub fn billed_cost_usd(&self) -> f64 {
        self.actual_cost_usd.unwrap_or(0.0)
    }
}
