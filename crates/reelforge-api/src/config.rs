//! Environment configuration.
//!
//! Provider credentials are optional: a missing key disables that adapter
//! and the pipeline degrades to its fallback path. Capability discovery
//! reports exactly what is configured, never guesses.

use reelforge_core::ProviderId;
use reelforge_governor::{GovernorConfig, QuotaLimits};
use std::collections::HashMap;

/// Env var holding each provider's credential.
fn key_var(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Claude => "CLAUDE_API_KEY",
        ProviderId::Heygen => "HEYGEN_API_KEY",
        ProviderId::Arcads => "ARCADS_API_KEY",
        ProviderId::Shotstack => "SHOTSTACK_API_KEY",
        ProviderId::Elevenlabs => "ELEVENLABS_API_KEY",
        ProviderId::Reddit => "REDDIT_CLIENT_ID",
        ProviderId::Fastmoss => "FASTMOSS_API_KEY",
        ProviderId::Kalodata => "KALODATA_API_KEY",
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub addr: String,
    /// Which providers have credentials configured.
    pub configured: HashMap<ProviderId, bool>,
    pub fact_check_enabled: bool,
    /// Empty means permissive CORS.
    pub allowed_origins: Vec<String>,
    pub governor: GovernorConfig,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let configured = ProviderId::all()
            .iter()
            .map(|&p| {
                let set = std::env::var(key_var(p)).map(|v| !v.is_empty()).unwrap_or(false);
                (p, set)
            })
            .collect();

        let mut governor = GovernorConfig::default();
        for &provider in ProviderId::all() {
            let prefix = format!("REELFORGE_{}", provider.as_str().to_uppercase());
            let base = governor.limits_for(provider);
            let max_calls = env_parse(&format!("{}_MAX_CALLS", prefix)).unwrap_or(base.max_calls);
            let max_cost =
                env_parse(&format!("{}_MAX_COST_USD", prefix)).unwrap_or(base.max_cost_usd);
            let max_tokens =
                env_parse(&format!("{}_MAX_TOKENS", prefix)).unwrap_or(base.max_tokens);
            governor = governor.with_limit(
                provider,
                QuotaLimits::new(max_calls, max_cost, max_tokens, base.max_concurrent),
            );
        }

        Self {
            addr: std::env::var("REELFORGE_ADDR").unwrap_or_else(|_| "0.0.0.0:8790".to_string()),
            configured,
            fact_check_enabled: std::env::var("REELFORGE_FACT_CHECK")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            allowed_origins: std::env::var("REELFORGE_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            governor,
        }
    }

    /// Configuration with no credentials at all, for tests.
    pub fn bare() -> Self {
        Self {
            addr: "127.0.0.1:0".to_string(),
            configured: ProviderId::all().iter().map(|&p| (p, false)).collect(),
            fact_check_enabled: false,
            allowed_origins: Vec::new(),
            governor: GovernorConfig::default(),
        }
    }

    /// Same, but with every provider marked configured.
    pub fn full() -> Self {
        Self {
            configured: ProviderId::all().iter().map(|&p| (p, true)).collect(),
            ..Self::bare()
        }
    }

    pub fn is_configured(&self, provider: ProviderId) -> bool {
        self.configured.get(&provider).copied().unwrap_or(false)
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}
