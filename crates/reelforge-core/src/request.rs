//! Generation requests and seeds.

use crate::error::OrchestratorError;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// What kind of content the seed describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedKind {
    Story,
    Product,
    Topic,
}

/// Numeric and boolean signals attached to a seed by upstream ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedSignals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_potential: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<u64>,
    /// Seed carries an affiliate link or product-purchase intent.
    #[serde(default)]
    pub affiliate_link: bool,
    /// Content was produced with AI assistance and must disclose it.
    #[serde(default)]
    pub ai_assisted: bool,
}

/// The input payload describing what content should be generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    pub kind: SeedKind,
    pub category: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub signals: SeedSignals,
    /// Truly dynamic provider payloads land here, never as typed fields.
    #[serde(default)]
    pub extras: HashMap<String, serde_json::Value>,
}

impl Seed {
    pub fn new(kind: SeedKind, category: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind,
            category: category.into(),
            title: title.into(),
            text: String::new(),
            signals: SeedSignals::default(),
            extras: HashMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_signals(mut self, signals: SeedSignals) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Stable content-addressed identity for fingerprinting.
    pub fn seed_id(&self) -> String {
        let kind = match self.kind {
            SeedKind::Story => "story",
            SeedKind::Product => "product",
            SeedKind::Topic => "topic",
        };
        let mut hasher = blake3::Hasher::new();
        hasher.update(kind.as_bytes());
        hasher.update(b"|");
        hasher.update(self.category.as_bytes());
        hasher.update(b"|");
        hasher.update(self.title.as_bytes());
        hasher.update(b"|");
        hasher.update(self.text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

/// How aggressive the emotional register of the script should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

/// Target publication platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Tiktok,
    InstagramReels,
    YoutubeShorts,
}

/// Either let the router pick or pin a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyChoice {
    #[default]
    Auto,
    Fixed(Strategy),
}

/// Immutable description of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub request_id: Uuid,
    pub seed: Seed,
    #[serde(default)]
    pub strategy: StrategyChoice,
    /// Requested number of script variations; the router may raise it.
    pub variation_count: u32,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub intensity: Intensity,
    /// Base seed for reproducible composition; variation i uses base + i.
    pub variation_seed: u64,
    pub target_duration_s: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    pub captions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    /// When set, the shadowban risk engine is consulted at admission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(seed: Seed) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            seed,
            strategy: StrategyChoice::Auto,
            variation_count: 1,
            platform: Platform::default(),
            intensity: Intensity::default(),
            variation_seed: 0,
            target_duration_s: 30.0,
            voice_id: None,
            captions: true,
            idempotency_key: None,
            account_id: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = StrategyChoice::Fixed(strategy);
        self
    }

    pub fn with_variations(mut self, count: u32) -> Self {
        self.variation_count = count;
        self
    }

    pub fn with_variation_seed(mut self, seed: u64) -> Self {
        self.variation_seed = seed;
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Validate request shape before any work is scheduled.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        if self.seed.category.trim().is_empty() {
            return Err(OrchestratorError::InvalidRequest(
                "seed category must not be empty".into(),
            ));
        }
        if self.seed.title.trim().is_empty() && self.seed.text.trim().is_empty() {
            return Err(OrchestratorError::InvalidRequest(
                "seed needs a title or text".into(),
            ));
        }
        if self.variation_count == 0 {
            return Err(OrchestratorError::InvalidRequest(
                "variation_count must be at least 1".into(),
            ));
        }
        if !(5.0..=600.0).contains(&self.target_duration_s) {
            return Err(OrchestratorError::InvalidRequest(format!(
                "target duration {}s outside 5..600",
                self.target_duration_s
            )));
        }
        Ok(())
    }
}
