//! Async generation jobs.

use crate::error::ErrorKind;
use crate::invocation::ProviderInvocation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Enhancing,
    Rendering,
    Finalizing,
    Done,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed | JobStatus::Cancelled)
    }
}

/// Structured failure detail kept on a failed or cancelled job, so callers
/// can branch on the kind and surface remediation without re-running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: ErrorKind,
    pub detail: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Observable state of one generation job.
///
/// `percent` is monotonic non-decreasing until a terminal state; the job
/// table enforces this on every update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub request_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: JobStatus,
    pub percent: u8,
    #[serde(default)]
    pub invocations: Vec<ProviderInvocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}

impl Job {
    pub fn new(request_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            request_id,
            created_at,
            status: JobStatus::Queued,
            percent: 0,
            invocations: Vec::new(),
            artifact_id: None,
            error: None,
        }
    }

    /// Raise progress, never lowering it.
    pub fn advance(&mut self, percent: u8) {
        if percent > self.percent {
            self.percent = percent.min(100);
        }
    }

    pub fn total_billed_cost_usd(&self) -> f64 {
        self.invocations.iter().map(|i| i.billed_cost_usd()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic() {
        let mut job = Job::new(Uuid::new_v4(), Utc::now());
        job.advance(20);
        job.advance(10);
        assert_eq!(job.percent, 20);
        job.advance(80);
        assert_eq!(job.percent, 80);
        job.advance(250);
        assert_eq!(job.percent, 100);
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Rendering.is_terminal());
    }
}
