//! Quota limits and governor configuration.

use reelforge_core::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Daily ceilings for one provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaLimits {
    pub max_calls: u32,
    pub max_cost_usd: f64,
    pub max_tokens: u64,
    pub max_concurrent: u32,
}

impl QuotaLimits {
    pub fn new(max_calls: u32, max_cost_usd: f64, max_tokens: u64, max_concurrent: u32) -> Self {
        Self { max_calls, max_cost_usd, max_tokens, max_concurrent }
    }

    /// Built-in safe defaults. Overridable through configuration; chosen so
    /// a runaway loop cannot produce a surprising bill.
    pub fn default_for(provider: ProviderId) -> Self {
        match provider {
            ProviderId::Claude => Self::new(100, 5.0, 500_000, 4),
            ProviderId::Heygen => Self::new(10, 25.0, 1_000_000, 2),
            ProviderId::Arcads => Self::new(10, 25.0, 1_000_000, 2),
            ProviderId::Shotstack => Self::new(25, 10.0, 1_000_000, 3),
            ProviderId::Elevenlabs => Self::new(50, 5.0, 1_000_000, 3),
            ProviderId::Reddit => Self::new(60, 1.0, 1_000_000, 4),
            ProviderId::Fastmoss => Self::new(100, 2.0, 1_000_000, 4),
            ProviderId::Kalodata => Self::new(100, 2.0, 1_000_000, 4),
        }
    }
}

/// Full governor configuration.
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    pub limits: HashMap<ProviderId, QuotaLimits>,
    /// Abandoned reservations are reaped after this many seconds.
    pub reservation_grace_s: i64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        let limits = ProviderId::all()
            .iter()
            .map(|&p| (p, QuotaLimits::default_for(p)))
            .collect();
        Self { limits, reservation_grace_s: 120 }
    }
}

impl GovernorConfig {
    pub fn with_limit(mut self, provider: ProviderId, limits: QuotaLimits) -> Self {
        self.limits.insert(provider, limits);
        self
    }

    pub fn limits_for(&self, provider: ProviderId) -> QuotaLimits {
        self.limits
            .get(&provider)
            .copied()
            .unwrap_or_else(|| QuotaLimits::default_for(provider))
    }
}
