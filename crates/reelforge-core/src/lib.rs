//! Reelforge Core: shared data model, error taxonomy, and clock.
//!
//! Everything the orchestrator components exchange lives here: generation
//! requests, scripts, jobs, artifacts, provider invocations, and the unified
//! error model. No I/O happens in this crate.

pub mod artifact;
pub mod clock;
pub mod error;
pub mod fingerprint;
pub mod invocation;
pub mod job;
pub mod request;
pub mod script;
pub mod strategy;
pub mod verdict;

pub use artifact::{Artifact, CostBreakdown, GenerationMethod, MediaKind, MediaRef, PostingInstructions};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorKind, OrchestratorError};
pub use fingerprint::Fingerprint;
pub use invocation::{FailureClass, InvocationStatus, ProviderId, ProviderInvocation};
pub use job::{Job, JobFailure, JobStatus};
pub use request::{GenerationRequest, Intensity, Platform, Seed, SeedKind, SeedSignals, StrategyChoice};
pub use script::{Script, Segment, SegmentRole};
pub use strategy::Strategy;
pub use verdict::{ComplianceIssue, ComplianceStatus, ComplianceVerdict, RiskGrade};

/// Engine version reported by health and capability endpoints.
pub const REELFORGE_VERSION: &str = "1.0.0";
