//! Artifact Cache.
//!
//! Content-addressed memoization keyed by request fingerprint. For any
//! fingerprint at most one build runs at a time; concurrent submitters of
//! the same fingerprint await the in-flight result instead of duplicating
//! provider spend. Entries expire after a TTL.
//!
//! The store is in-memory; a durable backend can replace it behind the same
//! interface without touching the single-flight logic.

use chrono::{DateTime, Duration, Utc};
use reelforge_core::{Artifact, Clock, Fingerprint, OrchestratorError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

struct CacheEntry {
    artifact: Arc<Artifact>,
    inserted_at: DateTime<Utc>,
}

type BuildResult = Option<Result<Arc<Artifact>, String>>;

pub struct ArtifactCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    inflight: Mutex<HashMap<String, watch::Receiver<BuildResult>>>,
}

impl ArtifactCache {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// One-hour TTL default.
    pub fn with_default_ttl(clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, Duration::hours(1))
    }

    /// Live entry for the fingerprint, if any.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<Artifact>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(fingerprint.as_str()) {
            Some(entry) if now - entry.inserted_at < self.ttl => Some(entry.artifact.clone()),
            Some(_) => {
                entries.remove(fingerprint.as_str());
                None
            }
            None => None,
        }
    }

    /// Lookup by raw artifact id (the fingerprint string a job records).
    pub fn get_by_id(&self, artifact_id: &str) -> Option<Arc<Artifact>> {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap();
        match entries.get(artifact_id) {
            Some(entry) if now - entry.inserted_at < self.ttl => Some(entry.artifact.clone()),
            _ => None,
        }
    }

    /// Insert without a build (used when the artifact came from elsewhere).
    pub fn insert(&self, fingerprint: &Fingerprint, artifact: Arc<Artifact>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            fingerprint.as_str().to_string(),
            CacheEntry { artifact, inserted_at: self.clock.now() },
        );
    }

    /// Return the cached artifact or run `build` exactly once, with
    /// concurrent callers awaiting the winner's result.
    ///
    /// Build failures propagate to every waiter (flattened to `Internal`
    /// for the non-building waiters) and leave no cache entry behind, so
    /// the next caller retries.
    pub async fn get_or_build<F, Fut>(
        &self,
        fingerprint: &Fingerprint,
        build: F,
    ) -> Result<Arc<Artifact>, OrchestratorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Artifact, OrchestratorError>>,
    {
        // Whether this caller becomes the builder or waits on another's
        // build is decided under the inflight lock; the lock is released
        // before any await so the guard never crosses a suspension point.
        enum Flight {
            Wait(watch::Receiver<BuildResult>),
            Build(watch::Sender<BuildResult>),
        }

        // Fast path plus single-flight registration under one lock scope.
        let flight = {
            if let Some(hit) = self.get(fingerprint) {
                return Ok(hit);
            }
            let mut inflight = self.inflight.lock().unwrap();
            // A builder whose future was dropped (job deadline, shutdown)
            // leaves a receiver with no sender; clear it so the build can
            // be retried instead of wedging the fingerprint.
            let stale = inflight
                .get(fingerprint.as_str())
                .map(|rx| rx.has_changed().is_err())
                .unwrap_or(false);
            if stale {
                inflight.remove(fingerprint.as_str());
            }
            match inflight.get(fingerprint.as_str()).cloned() {
                Some(rx) => Flight::Wait(rx),
                None => {
                    // A build may have completed between the miss above and
                    // taking this lock; re-check before becoming the builder.
                    if let Some(hit) = self.get(fingerprint) {
                        return Ok(hit);
                    }
                    let (tx, rx) = watch::channel(None);
                    inflight.insert(fingerprint.as_str().to_string(), rx);
                    Flight::Build(tx)
                }
            }
        };

        let mut rx = match flight {
            Flight::Build(tx) => return self.run_build(fingerprint, build, tx).await,
            Flight::Wait(rx) => rx,
        };

        // Another caller is building; wait for its announcement.
        loop {
            if let Some(result) = rx.borrow().clone() {
                return result.map_err(OrchestratorError::Internal);
            }
            if rx.changed().await.is_err() {
                // Builder dropped without announcing; treat as a miss.
                return Err(OrchestratorError::Internal(
                    "artifact build abandoned".to_string(),
                ));
            }
        }
    }

    async fn run_build<F, Fut>(
        &self,
        fingerprint: &Fingerprint,
        build: F,
        tx: watch::Sender<BuildResult>,
    ) -> Result<Arc<Artifact>, OrchestratorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Artifact, OrchestratorError>>,
    {
        match build().await {
            Ok(artifact) => {
                let shared = Arc::new(artifact);
                // Entry goes live before the inflight marker clears, so a
                // racing submitter always finds one or the other.
                self.insert(fingerprint, shared.clone());
                self.inflight.lock().unwrap().remove(fingerprint.as_str());
                let _ = tx.send(Some(Ok(shared.clone())));
                Ok(shared)
            }
            Err(err) => {
                self.inflight.lock().unwrap().remove(fingerprint.as_str());
                let _ = tx.send(Some(Err(err.to_string())));
                Err(err)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reelforge_core::{
        ComplianceVerdict, CostBreakdown, GenerationMethod, GenerationRequest, ManualClock,
        PostingInstructions, Script, Seed, SeedKind, Strategy,
    };
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    fn fingerprint(n: u64) -> Fingerprint {
        let request = GenerationRequest::new(Seed::new(SeedKind::Topic, "sleep", "Sleep"));
        Fingerprint::compute(&request, Strategy::Educational, n)
    }

    fn artifact(id: &str) -> Artifact {
        Artifact {
            artifact_id: id.to_string(),
            request_id: Uuid::new_v4(),
            strategy: Strategy::Educational,
            script: Script {
                segments: vec![],
                hashtags: vec![],
                estimated_duration_s: 0.0,
                word_count: 0,
                viral_score: 0,
            },
            media: vec![],
            cost: CostBreakdown::default(),
            posting: PostingInstructions {
                caption: String::new(),
                posting_time_hint: String::new(),
                tips: vec![],
            },
            overlays: Default::default(),
            verdict: ComplianceVerdict::compliant(),
            generation_method: GenerationMethod::Fallback,
            fallback_reason: None,
            rationale: String::new(),
            created_at: Utc::now(),
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_get_or_build_caches() {
        let cache = ArtifactCache::with_default_ttl(clock());
        let fp = fingerprint(1);
        let builds = AtomicU32::new(0);

        for _ in 0..3 {
            let result = cache
                .get_or_build(&fp, || async {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Ok(artifact("a"))
                })
                .await
                .unwrap();
            assert_eq!(result.artifact_id, "a");
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_rebuilds() {
        let clock = clock();
        let cache = ArtifactCache::with_default_ttl(clock.clone());
        let fp = fingerprint(2);
        let builds = AtomicU32::new(0);

        cache
            .get_or_build(&fp, || async {
                builds.fetch_add(1, Ordering::SeqCst);
                Ok(artifact("a"))
            })
            .await
            .unwrap();
        clock.advance(chrono::Duration::minutes(61));
        assert!(cache.get(&fp).is_none());
        cache
            .get_or_build(&fp, || async {
                builds.fetch_add(1, Ordering::SeqCst);
                Ok(artifact("b"))
            })
            .await
            .unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_submitters_share_one_build() {
        // At most one distinct artifact is ever built per fingerprint
        // while an entry is live.
        let cache = Arc::new(ArtifactCache::with_default_ttl(clock()));
        let fp = fingerprint(3);
        let builds = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let fp = fp.clone();
            let builds = builds.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(&fp, move || async move {
                        builds.fetch_add(1, Ordering::SeqCst);
                        // Let the other tasks pile onto the inflight entry.
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(artifact("shared"))
                    })
                    .await
                    .unwrap()
            }));
        }
        let results: Vec<Arc<Artifact>> =
            futures_join_all(handles).await.into_iter().collect();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result.artifact_id, "shared");
        }
    }

    async fn futures_join_all(
        handles: Vec<tokio::task::JoinHandle<Arc<Artifact>>>,
    ) -> Vec<Arc<Artifact>> {
        let mut out = Vec::new();
        for handle in handles {
            out.push(handle.await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_failed_build_leaves_no_entry() {
        let cache = ArtifactCache::with_default_ttl(clock());
        let fp = fingerprint(4);
        let err = cache
            .get_or_build(&fp, || async {
                Err(OrchestratorError::Internal("boom".into()))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), reelforge_core::ErrorKind::Internal);
        assert!(cache.get(&fp).is_none());

        // Next caller gets a fresh build.
        let ok = cache
            .get_or_build(&fp, || async { Ok(artifact("second")) })
            .await
            .unwrap();
        assert_eq!(ok.artifact_id, "second");
    }
}
