//! Router tunables.

use reelforge_core::ProviderId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Perceived authenticity per video provider (0..1).
    pub trust: HashMap<ProviderId, f32>,
    /// Stable tie-break order.
    pub priority: Vec<ProviderId>,
    /// Providers that can produce meaningfully distinct variations.
    pub variation_capable: HashSet<ProviderId>,
    /// Target monthly share per provider for mix rebalancing.
    pub target_share: HashMap<ProviderId, f64>,
    /// Revenue signal above this counts as "high revenue".
    pub revenue_threshold_usd: f64,
    /// Health-supplement lexicon for seed classification.
    pub supplement_lexicon: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let trust = HashMap::from([
            (ProviderId::Heygen, 0.9f32),
            (ProviderId::Arcads, 0.75),
            (ProviderId::Shotstack, 0.6),
        ]);
        let target_share = HashMap::from([
            (ProviderId::Heygen, 0.4f64),
            (ProviderId::Arcads, 0.4),
            (ProviderId::Shotstack, 0.2),
        ]);
        Self {
            trust,
            priority: vec![ProviderId::Heygen, ProviderId::Arcads, ProviderId::Shotstack],
            variation_capable: HashSet::from([ProviderId::Arcads, ProviderId::Shotstack]),
            target_share,
            revenue_threshold_usd: 10_000.0,
            supplement_lexicon: [
                "supplement", "vitamin", "mineral", "capsule", "gummies", "probiotic",
                "collagen", "magnesium", "ashwagandha", "coq10", "creatine", "omega-3",
                "gut health", "energy levels", "fatigue", "bloating", "immunity",
                "metabolism", "sleep quality", "cortisol",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl RouterConfig {
    pub fn trust_of(&self, provider: ProviderId) -> f32 {
        self.trust.get(&provider).copied().unwrap_or(0.5)
    }

    pub fn target_share_of(&self, provider: ProviderId) -> f64 {
        self.target_share.get(&provider).copied().unwrap_or(0.25)
    }

    /// Position in the stable priority order; unknown providers sort last.
    pub fn priority_rank(&self, provider: ProviderId) -> usize {
        self.priority
            .iter()
            .position(|&p| p == provider)
            .unwrap_or(usize::MAX)
    }
}
