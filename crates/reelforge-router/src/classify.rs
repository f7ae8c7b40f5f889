//! Seed classification.

use crate::config::RouterConfig;
use reelforge_core::Seed;

/// A seed is supplement-viral when its text carries at least two lexicon
/// keywords, or one keyword together with a high revenue signal. Evaluated
/// before scoring; a positive result biases routing strongly toward the
/// supplement path.
pub fn is_supplement_seed(config: &RouterConfig, seed: &Seed) -> bool {
    let haystack = format!("{} {}", seed.title, seed.text).to_lowercase();
    let hits = config
        .supplement_lexicon
        .iter()
        .filter(|k| haystack.contains(k.as_str()))
        .count();
    let high_revenue = seed
        .signals
        .revenue_potential
        .map(|r| r >= config.revenue_threshold_usd)
        .unwrap_or(false);
    hits >= 2 || (hits >= 1 && high_revenue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelforge_core::{SeedKind, SeedSignals};

    #[test]
    fn test_two_keywords_classify() {
        let seed = Seed::new(SeedKind::Product, "supplement", "Magnesium glycinate")
            .with_text("Better sleep quality without the groggy mornings");
        assert!(is_supplement_seed(&RouterConfig::default(), &seed));
    }

    #[test]
    fn test_one_keyword_needs_revenue() {
        let config = RouterConfig::default();
        let seed = Seed::new(SeedKind::Product, "wellness", "Collagen powder")
            .with_text("Glow routine");
        assert!(!is_supplement_seed(&config, &seed));

        let rich = Seed::new(SeedKind::Product, "wellness", "Collagen powder")
            .with_text("Glow routine")
            .with_signals(SeedSignals {
                revenue_potential: Some(15_000.0),
                ..Default::default()
            });
        assert!(is_supplement_seed(&config, &rich));
    }

    #[test]
    fn test_unrelated_seed_not_classified() {
        let seed = Seed::new(SeedKind::Story, "drama", "Roommate saga")
            .with_text("She sold my couch while I was away");
        assert!(!is_supplement_seed(&RouterConfig::default(), &seed));
    }
}
