//! Adapter traits.
//!
//! All methods that reach the network are async; cost estimation is sync so
//! the governor can admit before any call is made.

use crate::error::ProviderError;
use async_trait::async_trait;
use reelforge_core::{MediaRef, ProviderId, Script, Seed, SeedSignals};
use serde::{Deserialize, Serialize};

/// LLM-backed script rewriting.
#[async_trait]
pub trait ScriptEnhancer: Send + Sync {
    fn id(&self) -> ProviderId;

    /// (USD, tokens) estimate for one enhancement call.
    fn estimate(&self, script: &Script) -> (f64, u64);

    /// Rewrite the composed script for punch and pacing. Must preserve the
    /// segment structure; only text and delivery notes may change.
    async fn enhance(&self, script: &Script, seed: &Seed) -> Result<Script, ProviderError>;
}

/// Voice synthesis for the finished script.
#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    fn id(&self) -> ProviderId;

    fn estimate(&self, script: &Script) -> (f64, u64);

    async fn synthesize(&self, script: &Script, voice_id: &str) -> Result<MediaRef, ProviderError>;
}

/// Parameters for one video render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub duration_s: f32,
    pub add_captions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
}

/// Opaque handle for an in-flight render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderHandle(pub String);

/// Poll result for an in-flight render.
#[derive(Debug, Clone)]
pub enum RenderState {
    InProgress { percent: u8 },
    Complete(MediaRef),
}

/// Async video rendering with a start/poll cycle.
#[async_trait]
pub trait VideoRenderer: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Whether the provider can produce meaningfully distinct variations.
    fn supports_variations(&self) -> bool;

    /// Perceived authenticity/trust of the output (0..1).
    fn trust_factor(&self) -> f32;

    fn estimate(&self, config: &RenderConfig) -> (f64, u64);

    async fn start_render(
        &self,
        script: &Script,
        config: &RenderConfig,
    ) -> Result<RenderHandle, ProviderError>;

    async fn poll(&self, handle: &RenderHandle) -> Result<RenderState, ProviderError>;
}

/// A candidate story pulled from a social source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySeed {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    /// Source-side engagement score, where available.
    #[serde(default)]
    pub score: u64,
}

/// Story ingestion from social platforms.
#[async_trait]
pub trait SocialScraper: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn scrape_stories(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<StorySeed>, ProviderError>;
}

/// Product/market signal lookup.
#[async_trait]
pub trait MarketData: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn product_signals(&self, product: &str) -> Result<SeedSignals, ProviderError>;
}
