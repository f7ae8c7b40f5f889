//! Generation strategies.
//!
//! A strategy is an abstract recipe: which provider class renders the video,
//! which script structure the composer follows, and how many variations are
//! worth producing.

use crate::invocation::ProviderId;
use crate::script::SegmentRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Polished expert-presenter video via human-avatar providers.
    AuthorityHuman,
    /// Casual creator-style footage, good for multi-variant A/B testing.
    UgcVariations,
    /// High-intensity supplement marketing path.
    SupplementViral,
    /// Calm explainer built from stock template renders.
    Educational,
}

impl Strategy {
    pub fn tag(&self) -> &'static str {
        match self {
            Strategy::AuthorityHuman => "authority_human",
            Strategy::UgcVariations => "ugc_variations",
            Strategy::SupplementViral => "supplement_viral",
            Strategy::Educational => "educational",
        }
    }

    pub fn all() -> &'static [Strategy] {
        &[
            Strategy::AuthorityHuman,
            Strategy::UgcVariations,
            Strategy::SupplementViral,
            Strategy::Educational,
        ]
    }

    /// Video providers in preference order for this strategy.
    pub fn provider_preference(&self) -> &'static [ProviderId] {
        match self {
            Strategy::AuthorityHuman => &[ProviderId::Heygen, ProviderId::Shotstack],
            Strategy::UgcVariations => &[ProviderId::Arcads, ProviderId::Heygen],
            Strategy::SupplementViral => &[ProviderId::Arcads, ProviderId::Heygen, ProviderId::Shotstack],
            Strategy::Educational => &[ProviderId::Shotstack, ProviderId::Heygen],
        }
    }

    /// Minimum provider trust factor this strategy tolerates (0..1).
    pub fn min_trust_factor(&self) -> f32 {
        match self {
            Strategy::AuthorityHuman => 0.85,
            Strategy::UgcVariations => 0.6,
            Strategy::SupplementViral => 0.7,
            Strategy::Educational => 0.5,
        }
    }

    /// Preferred (min, max) variation count.
    pub fn variation_range(&self) -> (u32, u32) {
        match self {
            Strategy::AuthorityHuman => (1, 1),
            Strategy::UgcVariations => (2, 3),
            Strategy::SupplementViral => (1, 3),
            Strategy::Educational => (1, 2),
        }
    }

    /// Ordered segment roles the composer fills for this strategy.
    pub fn structure(&self) -> &'static [SegmentRole] {
        use SegmentRole::*;
        match self {
            Strategy::AuthorityHuman => &[Hook, Opening, Revelation, Context, Cta, Disclosure],
            Strategy::UgcVariations => &[Hook, Opening, Consequence, Revelation, Cta, Disclosure],
            Strategy::SupplementViral => {
                &[Hook, Opening, Revelation, Context, Consequence, Cta, Disclosure]
            }
            Strategy::Educational => &[Hook, Context, Revelation, Cta, Disclosure],
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_strategy_starts_with_hook_and_ends_with_disclosure() {
        for strategy in Strategy::all() {
            let structure = strategy.structure();
            assert_eq!(structure.first(), Some(&SegmentRole::Hook), "{}", strategy);
            assert_eq!(structure.last(), Some(&SegmentRole::Disclosure), "{}", strategy);
            // CTA sits right before the disclosure everywhere.
            assert_eq!(structure[structure.len() - 2], SegmentRole::Cta, "{}", strategy);
        }
    }

    #[test]
    fn test_provider_preference_nonempty() {
        for strategy in Strategy::all() {
            assert!(!strategy.provider_preference().is_empty());
        }
    }

    #[test]
    fn test_variation_ranges_ordered() {
        for strategy in Strategy::all() {
            let (lo, hi) = strategy.variation_range();
            assert!(lo >= 1 && lo <= hi);
        }
    }
}
