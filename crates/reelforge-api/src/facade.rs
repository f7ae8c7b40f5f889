//! Orchestrator facade.
//!
//! Builds the component stack once per process and exposes the public
//! operations: `submit`, `status`, synchronous `generate`, story scraping,
//! and usage reporting. All wiring is constructor injection; nothing in the
//! stack reaches for ambient globals.

use crate::config::ApiConfig;
use reelforge_cache::ArtifactCache;
use reelforge_compliance::ComplianceGate;
use reelforge_composer::{seed_bindings, ComposerConfig, ScriptComposer};
use reelforge_core::{
    Artifact, Clock, GenerationRequest, Job, OrchestratorError, ProviderId, Seed, SystemClock,
};
use reelforge_governor::{Admission, GovernorSnapshot, QuotaGovernor};
use reelforge_jobs::{CoordinatorConfig, JobCoordinator};
use reelforge_providers::{
    CannedMarketData, CannedScraper, EchoEnhancer, InstantVoice, MarketData, ProviderSet,
    SocialScraper, StorySeed, StubRenderer,
};
use reelforge_registry::{instantiate, PoolKind, TemplateRegistry};
use reelforge_risk::ShadowbanRiskEngine;
use reelforge_router::{RouterConfig, StrategyRouter};
use std::sync::Arc;
use uuid::Uuid;

pub struct Orchestrator {
    config: ApiConfig,
    coordinator: Arc<JobCoordinator>,
    registry: Arc<TemplateRegistry>,
}

impl Orchestrator {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_timings(config, CoordinatorConfig::default())
    }

    /// Custom coordinator timings; test suites pass fast intervals.
    pub fn with_timings(config: ApiConfig, timings: CoordinatorConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let governor = Arc::new(QuotaGovernor::new(clock.clone(), config.governor.clone()));
        let registry = Arc::new(TemplateRegistry::builtin());
        let composer = Arc::new(ScriptComposer::new(registry.clone(), ComposerConfig::default()));
        let providers = providers_from(&config);
        let coordinator = Arc::new(JobCoordinator::new(
            governor,
            providers,
            Arc::new(StrategyRouter::new(clock.clone(), RouterConfig::default())),
            composer,
            Arc::new(ComplianceGate::default()),
            Arc::new(ShadowbanRiskEngine::default()),
            Arc::new(ArtifactCache::with_default_ttl(clock.clone())),
            clock,
            timings,
        ));
        Self { config, coordinator, registry }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Arc<JobCoordinator> {
        &self.coordinator
    }

    /// Validate and enqueue; returns promptly with the job id.
    pub fn submit(&self, request: GenerationRequest) -> Result<Uuid, OrchestratorError> {
        self.coordinator.submit(request)
    }

    pub fn status(&self, job_id: Uuid) -> Option<Job> {
        self.coordinator.status(job_id)
    }

    pub fn cancel(&self, job_id: Uuid) -> bool {
        self.coordinator.cancel(job_id)
    }

    pub fn artifact_for(&self, job: &Job) -> Option<Arc<Artifact>> {
        self.coordinator.artifact_for(job)
    }

    /// Submit and await under the configured deadline.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<Arc<Artifact>, OrchestratorError> {
        let job_id = self.submit(request)?;
        self.coordinator.run_to_completion(job_id).await
    }

    pub fn usage(&self) -> GovernorSnapshot {
        self.coordinator.governor().snapshot()
    }

    /// Alternative hook lines for the seed's category, instantiated with
    /// the same bindings the composer uses.
    pub fn hook_alternatives(&self, seed: &Seed, limit: usize) -> Vec<String> {
        let bindings = seed_bindings(seed);
        self.registry
            .pool(PoolKind::Hooks)
            .iter()
            .filter(|e| e.categories.is_empty() || e.categories.iter().any(|c| c == &seed.category))
            .filter_map(|e| instantiate(&e.text, &bindings).ok())
            .take(limit)
            .collect()
    }

    /// Enrich a product seed with live market signals when the market-data
    /// provider is configured. Soft-fails to `None`; real data is a bonus,
    /// never a dependency.
    pub async fn market_signals(&self, product: &str) -> Option<reelforge_core::SeedSignals> {
        let market = self.coordinator.providers().market.clone()?;
        let governor = self.coordinator.governor();
        let reservation = match governor.admit(market.id(), 0.0, 0) {
            Admission::Admitted(reservation) => reservation,
            Admission::Rejected { .. } => return None,
        };
        let timeout = self.coordinator.config().scrape_timeout;
        let result = tokio::time::timeout(timeout, market.product_signals(product)).await;
        governor.commit(reservation, 0.0, 0);
        match result {
            Ok(Ok(signals)) => Some(signals),
            _ => None,
        }
    }

    /// Pull candidate stories. Uses the configured scraper when present,
    /// otherwise the canned corpus, and reports which one served.
    pub async fn scrape_stories(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<(Vec<StorySeed>, bool), OrchestratorError> {
        let providers = self.coordinator.providers();
        let timeout = self.coordinator.config().scrape_timeout;
        match providers.scraper.clone() {
            Some(scraper) => {
                let governor = self.coordinator.governor();
                let reservation = match governor.admit(ProviderId::Reddit, 0.0, 0) {
                    Admission::Admitted(reservation) => reservation,
                    Admission::Rejected { reason, .. } => {
                        return Err(OrchestratorError::QuotaExceeded {
                            provider: ProviderId::Reddit,
                            reason: reason.as_str().to_string(),
                        });
                    }
                };
                let result =
                    tokio::time::timeout(timeout, scraper.scrape_stories(category, limit)).await;
                match result {
                    Ok(Ok(stories)) => {
                        governor.commit(reservation, 0.0, 0);
                        Ok((stories, true))
                    }
                    Ok(Err(err)) => {
                        governor.commit(reservation, 0.0, 0);
                        Err(err.into_orchestrator(ProviderId::Reddit))
                    }
                    Err(_) => {
                        governor.commit(reservation, 0.0, 0);
                        Err(OrchestratorError::Timeout("social scrape".into()))
                    }
                }
            }
            None => {
                let canned = CannedScraper;
                let stories = canned
                    .scrape_stories(category, limit)
                    .await
                    .map_err(|err| err.into_orchestrator(ProviderId::Reddit))?;
                Ok((stories, false))
            }
        }
    }
}

/// Wire adapters for every configured credential. The in-memory fakes stand
/// in for the concrete HTTP clients, which live outside this workspace and
/// replace them at this single injection point.
fn providers_from(config: &ApiConfig) -> ProviderSet {
    let mut set = ProviderSet::empty();
    if config.is_configured(ProviderId::Claude) {
        set.enhancer = Some(Arc::new(EchoEnhancer::default()));
    }
    if config.is_configured(ProviderId::Elevenlabs) {
        set.voice = Some(Arc::new(InstantVoice));
    }
    if config.is_configured(ProviderId::Heygen) {
        set.renderers.push(Arc::new(StubRenderer::heygen()));
    }
    if config.is_configured(ProviderId::Arcads) {
        set.renderers.push(Arc::new(StubRenderer::arcads()));
    }
    if config.is_configured(ProviderId::Shotstack) {
        set.renderers.push(Arc::new(StubRenderer::shotstack()));
    }
    if config.is_configured(ProviderId::Reddit) {
        set.scraper = Some(Arc::new(CannedScraper));
    }
    if config.is_configured(ProviderId::Fastmoss) {
        set.market = Some(Arc::new(CannedMarketData));
    }
    set
}
