//! Provider adapter contracts.
//!
//! Every external service the orchestrator can commission (LLM enhancement,
//! voice synthesis, video rendering, social scraping, market data) sits
//! behind one of these traits. The concrete HTTP clients live outside this
//! workspace; the fakes here are full in-memory implementations used by
//! tests and by deployments with no credentials configured.

pub mod error;
pub mod fakes;
pub mod traits;

pub use error::{classify_status, ProviderError};
pub use fakes::{
    CannedMarketData, CannedScraper, EchoEnhancer, FlakyEnhancer, InstantVoice, StubRenderer,
};
pub use traits::{
    MarketData, RenderConfig, RenderHandle, RenderState, ScriptEnhancer, SocialScraper,
    StorySeed, VideoRenderer, VoiceSynthesizer,
};

use std::sync::Arc;

/// The bundle of configured adapters handed to the coordinator.
///
/// `None` (or an empty renderer list) means the capability is not
/// configured; the pipeline degrades to its fallback path and capability
/// discovery reports the gap.
#[derive(Clone, Default)]
pub struct ProviderSet {
    pub enhancer: Option<Arc<dyn ScriptEnhancer>>,
    pub voice: Option<Arc<dyn VoiceSynthesizer>>,
    pub renderers: Vec<Arc<dyn VideoRenderer>>,
    pub scraper: Option<Arc<dyn SocialScraper>>,
    pub market: Option<Arc<dyn MarketData>>,
}

impl ProviderSet {
    /// No providers at all; everything falls back.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Full fake stack for tests and local development.
    pub fn with_fakes() -> Self {
        Self {
            enhancer: Some(Arc::new(EchoEnhancer::default())),
            voice: Some(Arc::new(InstantVoice::default())),
            renderers: vec![
                Arc::new(StubRenderer::heygen()),
                Arc::new(StubRenderer::arcads()),
                Arc::new(StubRenderer::shotstack()),
            ],
            scraper: Some(Arc::new(CannedScraper::default())),
            market: Some(Arc::new(CannedMarketData::default())),
        }
    }

    pub fn renderer(&self, id: reelforge_core::ProviderId) -> Option<Arc<dyn VideoRenderer>> {
        self.renderers.iter().find(|r| r.id() == id).cloned()
    }
}
