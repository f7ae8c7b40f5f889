//! In-memory job table.
//!
//! Owns every job's observable state plus its cancellation flag. All
//! mutation funnels through [`JobTable::update`], which is where progress
//! monotonicity is preserved (updates go through `Job::advance`).

use reelforge_core::{Job, JobStatus, ProviderInvocation};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct JobEntry {
    job: Job,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
pub struct JobTable {
    inner: Mutex<HashMap<Uuid, JobEntry>>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        let mut inner = self.inner.lock().unwrap();
        inner.insert(
            job.job_id,
            JobEntry { job, cancelled: Arc::new(AtomicBool::new(false)) },
        );
    }

    pub fn get(&self, job_id: Uuid) -> Option<Job> {
        self.inner.lock().unwrap().get(&job_id).map(|e| e.job.clone())
    }

    pub fn update(&self, job_id: Uuid, f: impl FnOnce(&mut Job)) {
        if let Some(entry) = self.inner.lock().unwrap().get_mut(&job_id) {
            f(&mut entry.job);
        }
    }

    /// Raise progress; never lowers it.
    pub fn advance(&self, job_id: Uuid, percent: u8) {
        self.update(job_id, |job| job.advance(percent));
    }

    pub fn push_invocation(&self, job_id: Uuid, invocation: ProviderInvocation) {
        self.update(job_id, |job| job.invocations.push(invocation));
    }

    /// Request cancellation. Returns false for unknown or already-terminal
    /// jobs. The pipeline observes the flag at its next step boundary.
    pub fn cancel(&self, job_id: Uuid) -> bool {
        let inner = self.inner.lock().unwrap();
        match inner.get(&job_id) {
            Some(entry) if !entry.job.status.is_terminal() => {
                entry.cancelled.store(true, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }

    pub fn is_cancelled(&self, job_id: Uuid) -> bool {
        self.inner
            .lock()
            .unwrap()
            .get(&job_id)
            .map(|e| e.cancelled.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job() -> Job {
        Job::new(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_insert_get_update() {
        let table = JobTable::new();
        let j = job();
        let id = j.job_id;
        table.insert(j);
        assert_eq!(table.get(id).unwrap().status, JobStatus::Queued);
        table.update(id, |job| job.status = JobStatus::Enhancing);
        assert_eq!(table.get(id).unwrap().status, JobStatus::Enhancing);
    }

    #[test]
    fn test_advance_is_monotonic() {
        let table = JobTable::new();
        let j = job();
        let id = j.job_id;
        table.insert(j);
        table.advance(id, 30);
        table.advance(id, 10);
        assert_eq!(table.get(id).unwrap().percent, 30);
    }

    #[test]
    fn test_cancel_only_live_jobs() {
        let table = JobTable::new();
        let j = job();
        let id = j.job_id;
        table.insert(j);
        assert!(table.cancel(id));
        assert!(table.is_cancelled(id));

        table.update(id, |job| job.status = JobStatus::Done);
        assert!(!table.cancel(id));
        assert!(!table.cancel(Uuid::new_v4()));
    }
}
