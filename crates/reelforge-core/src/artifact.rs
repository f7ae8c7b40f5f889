//! Final artifact bundle.

use crate::invocation::ProviderId;
use crate::script::Script;
use crate::strategy::Strategy;
use crate::verdict::ComplianceVerdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// How the script text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// An enhancement provider rewrote the composed script.
    Provider,
    /// Deterministic template path; zero provider cost.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Voiceover,
    Image,
}

/// A commissioned media asset; `locator` is a URL or opaque provider handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub provider: ProviderId,
    pub locator: String,
}

/// Aggregated spend for one artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub provider_cost_usd: f64,
    pub tokens: u64,
    pub invocations: u32,
}

/// Everything the operator needs to post the content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingInstructions {
    pub caption: String,
    /// Advisory best-window hint, not a schedule.
    pub posting_time_hint: String,
    pub tips: Vec<String>,
}

/// The immutable, versioned bundle returned to the caller.
///
/// `artifact_id` is the request fingerprint, so identical requests address
/// the same artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: String,
    pub request_id: Uuid,
    pub strategy: Strategy,
    pub script: Script,
    pub media: Vec<MediaRef>,
    pub cost: CostBreakdown,
    pub posting: PostingInstructions,
    /// Platform-specific overlay lines, keyed by platform tag.
    #[serde(default)]
    pub overlays: HashMap<String, Vec<String>>,
    pub verdict: ComplianceVerdict,
    pub generation_method: GenerationMethod,
    /// Set when the pipeline degraded, e.g. "quota_exceeded".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    /// Routing rationale rendered for the caller.
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// A `done` artifact must carry a compliant verdict; this is the
    /// invariant the finalize step checks before publishing.
    pub fn is_publishable(&self) -> bool {
        self.verdict.is_compliant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Segment, SegmentRole};

    fn minimal_script() -> Script {
        Script {
            segments: vec![Segment {
                role: SegmentRole::Hook,
                text: "hey".into(),
                tone: "casual".into(),
                start_s: 0.0,
                duration_s: 3.0,
                delivery_notes: None,
            }],
            hashtags: vec![],
            estimated_duration_s: 0.4,
            word_count: 1,
            viral_score: 10,
        }
    }

    #[test]
    fn test_publishable_requires_compliant_verdict() {
        let artifact = Artifact {
            artifact_id: "abc".into(),
            request_id: Uuid::new_v4(),
            strategy: Strategy::Educational,
            script: minimal_script(),
            media: vec![],
            cost: CostBreakdown::default(),
            posting: PostingInstructions {
                caption: "caption".into(),
                posting_time_hint: "evening".into(),
                tips: vec![],
            },
            overlays: HashMap::new(),
            verdict: ComplianceVerdict::compliant(),
            generation_method: GenerationMethod::Fallback,
            fallback_reason: None,
            rationale: String::new(),
            created_at: Utc::now(),
        };
        assert!(artifact.is_publishable());
    }
}
