//! The pipeline.

use crate::config::CoordinatorConfig;
use crate::fallback;
use crate::table::JobTable;
use reelforge_cache::ArtifactCache;
use reelforge_compliance::{apply_safe_language, ComplianceGate};
use reelforge_composer::ScriptComposer;
use reelforge_core::{
    Artifact, Clock, ComplianceIssue, ComplianceStatus, ComplianceVerdict, CostBreakdown,
    ErrorKind, FailureClass, Fingerprint, GenerationMethod, GenerationRequest, InvocationStatus,
    Job, JobStatus, MediaRef, OrchestratorError, ProviderInvocation, RiskGrade, Script,
};
use reelforge_core::job::JobFailure;
use reelforge_governor::{Admission, QuotaGovernor};
use reelforge_out::OutputRenderer;
use reelforge_providers::{ProviderSet, RenderConfig, RenderState};
use reelforge_risk::ShadowbanRiskEngine;
use reelforge_router::{RoutingDecision, StrategyRouter};
use std::sync::Arc;
use uuid::Uuid;

enum RenderOutcome {
    Complete(MediaRef),
    Failed(FailureClass),
    TimedOut,
}

/// Cloning is cheap: every component is shared behind an `Arc`, so a clone
/// is a handle onto the same job table, cache, and ledgers.
#[derive(Clone)]
pub struct JobCoordinator {
    governor: Arc<QuotaGovernor>,
    providers: ProviderSet,
    router: Arc<StrategyRouter>,
    composer: Arc<ScriptComposer>,
    gate: Arc<ComplianceGate>,
    risk: Arc<ShadowbanRiskEngine>,
    cache: Arc<ArtifactCache>,
    renderer: Arc<OutputRenderer>,
    jobs: Arc<JobTable>,
    clock: Arc<dyn Clock>,
    config: CoordinatorConfig,
}

impl JobCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        governor: Arc<QuotaGovernor>,
        providers: ProviderSet,
        router: Arc<StrategyRouter>,
        composer: Arc<ScriptComposer>,
        gate: Arc<ComplianceGate>,
        risk: Arc<ShadowbanRiskEngine>,
        cache: Arc<ArtifactCache>,
        clock: Arc<dyn Clock>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            governor,
            providers,
            router,
            composer,
            gate,
            risk,
            cache,
            renderer: Arc::new(OutputRenderer::new()),
            jobs: Arc::new(JobTable::new()),
            clock,
            config,
        }
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    pub fn governor(&self) -> &Arc<QuotaGovernor> {
        &self.governor
    }

    pub fn risk(&self) -> &Arc<ShadowbanRiskEngine> {
        &self.risk
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Create the job and start the pipeline. Returns promptly.
    pub fn submit(&self, request: GenerationRequest) -> Result<Uuid, OrchestratorError> {
        request.validate()?;
        let job = Job::new(request.request_id, self.clock.now());
        let job_id = job.job_id;
        self.jobs.insert(job);
        let this = self.clone();
        tokio::spawn(async move {
            this.run_job(job_id, request).await;
        });
        tracing::info!(%job_id, "job submitted");
        Ok(job_id)
    }

    pub fn status(&self, job_id: Uuid) -> Option<Job> {
        self.jobs.get(job_id)
    }

    /// Flip the cancellation flag; the pipeline stops at its next boundary.
    pub fn cancel(&self, job_id: Uuid) -> bool {
        self.jobs.cancel(job_id)
    }

    pub fn artifact_for(&self, job: &Job) -> Option<Arc<Artifact>> {
        job.artifact_id
            .as_deref()
            .and_then(|id| self.cache.get_by_id(id))
    }

    /// Await a submitted job under the job deadline.
    pub async fn run_to_completion(
        &self,
        job_id: Uuid,
    ) -> Result<Arc<Artifact>, OrchestratorError> {
        let deadline = tokio::time::Instant::now() + self.config.job_deadline;
        loop {
            let job = self
                .status(job_id)
                .ok_or_else(|| OrchestratorError::Internal(format!("unknown job {}", job_id)))?;
            if job.status.is_terminal() {
                return match job.status {
                    JobStatus::Done => self.artifact_for(&job).ok_or_else(|| {
                        OrchestratorError::Internal("done job lost its artifact".into())
                    }),
                    _ => Err(failure_to_error(job.error)),
                };
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(OrchestratorError::Timeout(format!("job {}", job_id)));
            }
            tokio::time::sleep(self.config.status_poll_interval).await;
        }
    }

    async fn run_job(&self, job_id: Uuid, request: GenerationRequest) {
        let outcome =
            tokio::time::timeout(self.config.job_deadline, self.execute(job_id, &request)).await;
        let outcome = match outcome {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::Timeout("job deadline elapsed".into())),
        };
        match outcome {
            Ok(artifact_id) => {
                self.jobs.update(job_id, |job| {
                    job.status = JobStatus::Done;
                    job.advance(100);
                    job.artifact_id = Some(artifact_id);
                });
                tracing::info!(%job_id, "job done");
            }
            Err(err) => {
                let kind = err.kind();
                let status = if kind == ErrorKind::Cancelled {
                    JobStatus::Cancelled
                } else {
                    JobStatus::Failed
                };
                let recommendations = match &err {
                    OrchestratorError::ComplianceBlocked { verdict } => verdict.recommendations(),
                    _ => Vec::new(),
                };
                tracing::warn!(%job_id, error = %err, "job ended unsuccessfully");
                self.jobs.update(job_id, |job| {
                    job.status = status;
                    job.error = Some(JobFailure {
                        kind,
                        detail: err.to_string(),
                        recommendations,
                    });
                });
            }
        }
    }

    async fn execute(
        &self,
        job_id: Uuid,
        request: &GenerationRequest,
    ) -> Result<String, OrchestratorError> {
        if let Some(account) = &request.account_id {
            if self.risk.vetoes(account, self.clock.now()) {
                return Err(OrchestratorError::ComplianceBlocked {
                    verdict: Box::new(risk_veto_verdict(account)),
                });
            }
        }

        let decision = self.router.route(request, self.governor.as_ref());
        let fingerprint =
            Fingerprint::compute(request, decision.strategy, request.variation_seed);
        let artifact = self
            .cache
            .get_or_build(&fingerprint, || {
                self.build_artifact(job_id, request, &decision, &fingerprint)
            })
            .await?;
        Ok(artifact.artifact_id.clone())
    }

    async fn build_artifact(
        &self,
        job_id: Uuid,
        request: &GenerationRequest,
        decision: &RoutingDecision,
        fingerprint: &Fingerprint,
    ) -> Result<Artifact, OrchestratorError> {
        let weights = self.config.step_weights;
        self.jobs.update(job_id, |job| job.status = JobStatus::Enhancing);

        // Compose, then audit before a single provider call is admitted.
        let script = self.composer.compose(
            decision.strategy,
            &request.seed,
            request.intensity,
            request.target_duration_s,
            request.variation_seed,
        )?;
        let admission = self.gate.audit(&script, &request.seed);
        if admission.is_blocked() {
            return Err(OrchestratorError::ComplianceBlocked {
                verdict: Box::new(admission),
            });
        }
        self.jobs.advance(job_id, weights.after_compose());
        self.ensure_active(job_id)?;

        let (script, method, fallback_reason) =
            self.enhance_step(job_id, script, request).await?;
        self.jobs.advance(job_id, weights.after_enhance());
        self.jobs.update(job_id, |job| job.status = JobStatus::Rendering);
        self.ensure_active(job_id)?;

        let media = self.provision_step(job_id, &script, request, decision).await;
        self.jobs.advance(job_id, weights.after_provision());
        self.jobs.update(job_id, |job| job.status = JobStatus::Finalizing);
        self.ensure_active(job_id)?;

        let (script, verdict) = self.finalize_script(script, request)?;

        let invocations = self
            .status(job_id)
            .map(|job| job.invocations)
            .unwrap_or_default();
        let cost = CostBreakdown {
            provider_cost_usd: invocations.iter().map(|i| i.billed_cost_usd()).sum(),
            tokens: invocations.iter().filter_map(|i| i.actual_tokens).sum(),
            invocations: invocations
                .iter()
                .filter(|i| i.status == InvocationStatus::Ok)
                .count() as u32,
        };
        let reason_line = decision
            .reasoning
            .last()
            .map(String::as_str)
            .unwrap_or("routing complete");
        Ok(Artifact {
            artifact_id: fingerprint.as_str().to_string(),
            request_id: request.request_id,
            strategy: decision.strategy,
            posting: self
                .renderer
                .posting(request.platform, decision.strategy, &script),
            overlays: self.renderer.overlays(
                request.platform,
                request.seed.signals.affiliate_link,
                request.seed.signals.ai_assisted,
            ),
            rationale: self
                .renderer
                .business_rationale(decision.strategy, reason_line, &script),
            script,
            media,
            cost,
            verdict,
            generation_method: method,
            fallback_reason,
            created_at: self.clock.now(),
        })
    }

    /// Enhance via the configured provider, retrying transient failures
    /// with fresh admissions, or fall back to the deterministic template.
    async fn enhance_step(
        &self,
        job_id: Uuid,
        script: Script,
        request: &GenerationRequest,
    ) -> Result<(Script, GenerationMethod, Option<String>), OrchestratorError> {
        let Some(enhancer) = self.providers.enhancer.clone() else {
            tracing::info!(%job_id, "no enhancement provider; template fallback");
            return Ok((
                fallback::fallback_script(&request.seed, request.target_duration_s),
                GenerationMethod::Fallback,
                Some("no_provider".to_string()),
            ));
        };

        let mut attempt = 1u32;
        loop {
            self.ensure_active(job_id)?;
            let (est_cost, est_tokens) = enhancer.estimate(&script);
            let record = ProviderInvocation::new(enhancer.id(), "enhance")
                .with_estimate(est_cost, est_tokens)
                .with_attempt(attempt);

            let reservation = match self.governor.admit(enhancer.id(), est_cost, est_tokens) {
                Admission::Admitted(reservation) => reservation,
                Admission::Rejected { .. } => {
                    self.jobs.push_invocation(job_id, record.rejected());
                    tracing::warn!(%job_id, "enhancement over quota; template fallback");
                    return Ok((
                        fallback::fallback_script(&request.seed, request.target_duration_s),
                        GenerationMethod::Fallback,
                        Some("quota_exceeded".to_string()),
                    ));
                }
            };

            match tokio::time::timeout(
                self.config.enhance_timeout,
                enhancer.enhance(&script, &request.seed),
            )
            .await
            {
                Ok(Ok(enhanced)) => {
                    self.governor.commit(reservation, est_cost, est_tokens);
                    self.jobs
                        .push_invocation(job_id, record.completed(est_cost, est_tokens));
                    return Ok((enhanced, GenerationMethod::Provider, None));
                }
                Ok(Err(err)) => {
                    let class = err.class();
                    self.governor.commit(reservation, 0.0, 0);
                    self.jobs.push_invocation(job_id, record.failed(class));
                    if class == FailureClass::Transient && attempt < self.config.max_attempts {
                        attempt += 1;
                        continue;
                    }
                    tracing::warn!(%job_id, error = %err, "enhancement failed; template fallback");
                    return Ok((
                        fallback::fallback_script(&request.seed, request.target_duration_s),
                        GenerationMethod::Fallback,
                        Some("provider_error".to_string()),
                    ));
                }
                Err(_) => {
                    // The call may have landed upstream; reflect the
                    // estimated spend rather than under-count.
                    self.governor.commit(reservation, est_cost, est_tokens);
                    self.jobs
                        .push_invocation(job_id, record.failed(FailureClass::Timeout));
                    return Ok((
                        fallback::fallback_script(&request.seed, request.target_duration_s),
                        GenerationMethod::Fallback,
                        Some("timeout".to_string()),
                    ));
                }
            }
        }
    }

    /// Voice and video in parallel. Media provisioning degrades instead of
    /// failing: a script-only artifact is still useful.
    async fn provision_step(
        &self,
        job_id: Uuid,
        script: &Script,
        request: &GenerationRequest,
        decision: &RoutingDecision,
    ) -> Vec<MediaRef> {
        let (voice, mut videos) = tokio::join!(
            self.voice_step(job_id, script, request),
            self.video_step(job_id, script, request, decision),
        );
        let mut media = Vec::new();
        if let Some(v) = voice {
            media.push(v);
        }
        media.append(&mut videos);
        media
    }

    async fn voice_step(
        &self,
        job_id: Uuid,
        script: &Script,
        request: &GenerationRequest,
    ) -> Option<MediaRef> {
        let synth = self.providers.voice.clone()?;
        let voice_id = request
            .voice_id
            .clone()
            .unwrap_or_else(|| "narrator_default".to_string());
        let mut attempt = 1u32;
        loop {
            let (est_cost, est_tokens) = synth.estimate(script);
            let record = ProviderInvocation::new(synth.id(), "synthesize")
                .with_estimate(est_cost, est_tokens)
                .with_attempt(attempt);
            let reservation = match self.governor.admit(synth.id(), est_cost, est_tokens) {
                Admission::Admitted(reservation) => reservation,
                Admission::Rejected { .. } => {
                    self.jobs.push_invocation(job_id, record.rejected());
                    tracing::warn!(%job_id, "voice over quota; skipping voiceover");
                    return None;
                }
            };
            match tokio::time::timeout(
                self.config.voice_timeout,
                synth.synthesize(script, &voice_id),
            )
            .await
            {
                Ok(Ok(media)) => {
                    self.governor.commit(reservation, est_cost, est_tokens);
                    self.jobs
                        .push_invocation(job_id, record.completed(est_cost, est_tokens));
                    return Some(media);
                }
                Ok(Err(err)) => {
                    let class = err.class();
                    self.governor.commit(reservation, 0.0, 0);
                    self.jobs.push_invocation(job_id, record.failed(class));
                    if class == FailureClass::Transient && attempt < self.config.max_attempts {
                        attempt += 1;
                        continue;
                    }
                    tracing::warn!(%job_id, error = %err, "voice synthesis failed; continuing without");
                    return None;
                }
                Err(_) => {
                    self.governor.commit(reservation, est_cost, est_tokens);
                    self.jobs
                        .push_invocation(job_id, record.failed(FailureClass::Timeout));
                    return None;
                }
            }
        }
    }

    /// One render per variation; each variation is its own admission and
    /// shows up as a distinct guarded invocation.
    async fn video_step(
        &self,
        job_id: Uuid,
        script: &Script,
        request: &GenerationRequest,
        decision: &RoutingDecision,
    ) -> Vec<MediaRef> {
        let Some(video) = self.providers.renderer(decision.provider) else {
            tracing::info!(%job_id, provider = %decision.provider, "video provider not configured");
            return Vec::new();
        };
        let render_config = RenderConfig {
            duration_s: request.target_duration_s,
            add_captions: request.captions,
            background_url: request
                .seed
                .extras
                .get("background_url")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        };

        let mut media = Vec::new();
        for variation in 0..decision.variation_count {
            let vseed = request.variation_seed.wrapping_add(variation as u64);
            let script_v = if variation == 0 {
                script.clone()
            } else {
                self.composer
                    .compose(
                        decision.strategy,
                        &request.seed,
                        request.intensity,
                        request.target_duration_s,
                        vseed,
                    )
                    .unwrap_or_else(|_| script.clone())
            };

            let (est_cost, est_tokens) = video.estimate(&render_config);
            let record = ProviderInvocation::new(video.id(), format!("render@v{}", vseed))
                .with_estimate(est_cost, est_tokens);
            let reservation = match self.governor.admit(video.id(), est_cost, est_tokens) {
                Admission::Admitted(reservation) => reservation,
                Admission::Rejected { .. } => {
                    self.jobs.push_invocation(job_id, record.rejected());
                    continue;
                }
            };

            let started = match video.start_render(&script_v, &render_config).await {
                Ok(handle) => handle,
                Err(err) => {
                    self.governor.commit(reservation, 0.0, 0);
                    self.jobs.push_invocation(job_id, record.failed(err.class()));
                    continue;
                }
            };

            match self.poll_render(video.as_ref(), &started).await {
                RenderOutcome::Complete(asset) => {
                    self.governor.commit(reservation, est_cost, est_tokens);
                    self.jobs
                        .push_invocation(job_id, record.completed(est_cost, est_tokens));
                    media.push(asset);
                }
                RenderOutcome::Failed(class) => {
                    self.governor.commit(reservation, 0.0, 0);
                    self.jobs.push_invocation(job_id, record.failed(class));
                }
                RenderOutcome::TimedOut => {
                    // The render may still be burning provider budget.
                    self.governor.commit(reservation, est_cost, est_tokens);
                    self.jobs
                        .push_invocation(job_id, record.failed(FailureClass::Timeout));
                }
            }
        }
        media
    }

    async fn poll_render(
        &self,
        video: &dyn reelforge_providers::VideoRenderer,
        handle: &reelforge_providers::RenderHandle,
    ) -> RenderOutcome {
        let deadline = tokio::time::Instant::now() + self.config.video_deadline;
        loop {
            if tokio::time::Instant::now() >= deadline {
                return RenderOutcome::TimedOut;
            }
            match video.poll(handle).await {
                Ok(RenderState::Complete(asset)) => return RenderOutcome::Complete(asset),
                Ok(RenderState::InProgress { .. }) => {
                    tokio::time::sleep(self.config.video_poll_interval).await;
                }
                Err(err) if err.class() == FailureClass::Transient => {
                    tokio::time::sleep(self.config.video_poll_interval).await;
                }
                Err(err) => return RenderOutcome::Failed(err.class()),
            }
        }
    }

    /// Final gate: remediate what can be remediated, then require a
    /// compliant verdict before the artifact exists.
    fn finalize_script(
        &self,
        script: Script,
        request: &GenerationRequest,
    ) -> Result<(Script, ComplianceVerdict), OrchestratorError> {
        let verdict = self.gate.audit(&script, &request.seed);
        match verdict.status {
            ComplianceStatus::Compliant => Ok((script, verdict)),
            ComplianceStatus::Blocked => Err(OrchestratorError::ComplianceBlocked {
                verdict: Box::new(verdict),
            }),
            ComplianceStatus::NeedsRemediation => {
                let mut fixed = script;
                for segment in &mut fixed.segments {
                    segment.text = apply_safe_language(&segment.text);
                }
                for addition in &verdict.required_additions {
                    match addition.as_str() {
                        "#ad" => {
                            if !fixed.hashtags.iter().any(|t| t.eq_ignore_ascii_case("#ad")) {
                                fixed.hashtags.insert(0, "#ad".to_string());
                            }
                        }
                        "AI disclosure" => {
                            if !fixed
                                .hashtags
                                .iter()
                                .any(|t| t.eq_ignore_ascii_case("#aigenerated"))
                            {
                                fixed.hashtags.insert(0, "#AIGenerated".to_string());
                            }
                        }
                        _ => {}
                    }
                }
                fixed.hashtags.truncate(self.gate.hashtag_max());
                let text = fixed
                    .segments
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                fixed.word_count = Script::count_words(&text);
                fixed.estimated_duration_s = Script::estimate_duration_s(fixed.word_count);

                let second = self.gate.audit(&fixed, &request.seed);
                if second.is_compliant() {
                    tracing::info!("remediation applied; script now compliant");
                    Ok((fixed, second))
                } else {
                    Err(OrchestratorError::ComplianceBlocked {
                        verdict: Box::new(second),
                    })
                }
            }
        }
    }

    fn ensure_active(&self, job_id: Uuid) -> Result<(), OrchestratorError> {
        if self.jobs.is_cancelled(job_id) {
            Err(OrchestratorError::Cancelled(format!("job {}", job_id)))
        } else {
            Ok(())
        }
    }
}

fn failure_to_error(failure: Option<JobFailure>) -> OrchestratorError {
    let failure = match failure {
        Some(failure) => failure,
        None => return OrchestratorError::Internal("job failed without detail".into()),
    };
    match failure.kind {
        ErrorKind::ComplianceBlocked => {
            let mut issues = vec![ComplianceIssue::new("blocked", failure.detail)];
            issues.extend(failure.recommendations.iter().map(|rec| {
                ComplianceIssue::new("remediation", rec.clone()).with_suggestion(rec.clone())
            }));
            OrchestratorError::ComplianceBlocked {
                verdict: Box::new(ComplianceVerdict {
                    status: ComplianceStatus::Blocked,
                    issues,
                    required_additions: Vec::new(),
                    risk_grade: RiskGrade::High,
                    safety_score: 0,
                }),
            }
        }
        ErrorKind::Cancelled => OrchestratorError::Cancelled(failure.detail),
        ErrorKind::Timeout => OrchestratorError::Timeout(failure.detail),
        ErrorKind::InvalidRequest => OrchestratorError::InvalidRequest(failure.detail),
        ErrorKind::TemplateGap => OrchestratorError::TemplateGap(failure.detail),
        _ => OrchestratorError::Internal(failure.detail),
    }
}

fn risk_veto_verdict(account: &str) -> ComplianceVerdict {
    ComplianceVerdict {
        status: ComplianceStatus::Blocked,
        issues: vec![ComplianceIssue::new(
            "account_risk",
            format!("account {} is at severe shadowban risk; posting paused", account),
        )],
        required_additions: vec!["wait out the recovery pause before posting".to_string()],
        risk_grade: RiskGrade::High,
        safety_score: 0,
    }
}
