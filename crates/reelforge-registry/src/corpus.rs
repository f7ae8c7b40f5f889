//! Built-in default corpus.
//!
//! A deployment normally ships its own corpus file; these defaults keep the
//! pipeline functional (and the fallback path non-empty) with no
//! configuration at all. Placeholders used: {PRODUCT}, {PAIN_POINT},
//! {INGREDIENT}, {CATEGORY}.

use crate::registry::{PoolKind, TemplateEntry, TemplateRegistry};
use std::collections::HashMap;

impl TemplateRegistry {
    /// Registry preloaded with the built-in corpus.
    pub fn builtin() -> Self {
        let mut pools: HashMap<PoolKind, Vec<TemplateEntry>> = HashMap::new();

        pools.insert(
            PoolKind::Hooks,
            vec![
                TemplateEntry::new("Stop scrolling. You need to hear this about {PRODUCT}.")
                    .with_weight(2.2)
                    .with_tone("urgent"),
                TemplateEntry::new("Nobody talks about this {CATEGORY} secret.")
                    .with_weight(1.8)
                    .with_tone("conspiratorial"),
                TemplateEntry::new("I was today years old when I found out about {PRODUCT}.")
                    .with_weight(1.6)
                    .with_tone("surprised"),
                TemplateEntry::new("POV: you finally fixed {PAIN_POINT}.")
                    .with_weight(1.7)
                    .with_tone("relatable"),
                TemplateEntry::new("This is your sign to stop ignoring {PAIN_POINT}.")
                    .with_weight(1.5)
                    .with_tone("urgent"),
                TemplateEntry::new("Three things I wish I knew before buying {PRODUCT}.")
                    .with_weight(1.4)
                    .with_tone("helpful"),
                TemplateEntry::new("The {CATEGORY} industry does not want you to see this.")
                    .with_weight(2.0)
                    .with_tone("conspiratorial"),
                TemplateEntry::new("Doctors are finally talking about {INGREDIENT}.")
                    .with_weight(2.4)
                    .with_categories(&["supplement", "chronic_fatigue", "sleep", "gut_health"])
                    .with_tone("authoritative"),
                TemplateEntry::new("Your {PAIN_POINT} might not be what you think it is.")
                    .with_weight(2.1)
                    .with_categories(&["supplement", "chronic_fatigue", "sleep", "gut_health"])
                    .with_tone("intriguing"),
                TemplateEntry::new("I read the story so you don't have to. It gets worse.")
                    .with_weight(1.9)
                    .with_categories(&["drama", "horror", "revenge", "mystery", "wholesome"])
                    .with_tone("dramatic"),
            ],
        );

        pools.insert(
            PoolKind::EmotionalTriggers,
            vec![
                TemplateEntry::new("Imagine waking up and {PAIN_POINT} is just gone.")
                    .with_tone("hopeful"),
                TemplateEntry::new("You have tried everything and nothing sticks. That is not your fault.")
                    .with_weight(1.6)
                    .with_tone("validating"),
                TemplateEntry::new("Every day you wait, it quietly gets harder to fix.")
                    .with_weight(1.4)
                    .with_tone("urgent"),
                TemplateEntry::new("The comments on this story broke me a little.")
                    .with_categories(&["drama", "horror", "revenge", "mystery", "wholesome"])
                    .with_tone("emotional"),
                TemplateEntry::new("Thousands of people deal with {PAIN_POINT} and never say a word.")
                    .with_weight(1.3)
                    .with_tone("validating"),
            ],
        );

        pools.insert(
            PoolKind::PainAmplifiers,
            vec![
                TemplateEntry::new("The worst part of {PAIN_POINT} is how normal it starts to feel.")
                    .with_weight(1.5),
                TemplateEntry::new("You cancel plans, you push through, and it still wins."),
                TemplateEntry::new("Coffee stopped helping months ago, didn't it?")
                    .with_categories(&["chronic_fatigue", "sleep", "supplement"])
                    .with_weight(1.8),
                TemplateEntry::new("And then it escalated in a way nobody saw coming.")
                    .with_categories(&["drama", "horror", "revenge", "mystery", "wholesome"]),
                TemplateEntry::new("Most fixes treat the symptom and leave {PAIN_POINT} untouched.")
                    .with_weight(1.2),
            ],
        );

        pools.insert(
            PoolKind::AuthorityMarkers,
            vec![
                TemplateEntry::new("Here is what actually changed things: {INGREDIENT}.")
                    .with_weight(1.8)
                    .with_categories(&["supplement", "chronic_fatigue", "sleep", "gut_health"]),
                TemplateEntry::new("The mechanism is simple once someone explains it properly.")
                    .with_weight(1.4),
                TemplateEntry::new("Reviewers keep coming back to the same detail about {PRODUCT}.")
                    .with_weight(1.3),
                TemplateEntry::new("I checked the sources behind this one, and the receipts hold up.")
                    .with_categories(&["drama", "horror", "revenge", "mystery", "wholesome"]),
                TemplateEntry::new("This is the part most videos about {CATEGORY} skip."),
            ],
        );

        pools.insert(
            PoolKind::Ctas,
            vec![
                TemplateEntry::new("Grab {PRODUCT} from the link before it sells out again.")
                    .with_weight(2.5)
                    .with_tone("direct"),
                TemplateEntry::new("Follow for part two, it gets wilder.")
                    .with_weight(1.8)
                    .with_categories(&["drama", "horror", "revenge", "mystery", "wholesome"])
                    .with_tone("teaser"),
                TemplateEntry::new("Comment YES if you want the full breakdown.")
                    .with_weight(1.6)
                    .with_tone("engagement"),
                TemplateEntry::new("Save this so you don't lose it.")
                    .with_weight(1.2)
                    .with_tone("soft"),
                TemplateEntry::new("Check the link in bio for {PRODUCT}.")
                    .with_weight(2.0)
                    .with_tone("direct"),
            ],
        );

        pools.insert(
            PoolKind::Disclosures,
            vec![
                TemplateEntry::new("#ad As an affiliate I may earn from qualifying purchases.")
                    .with_categories(&["affiliate"])
                    .with_weight(2.0),
                TemplateEntry::new("#ad Paid partnership.")
                    .with_categories(&["affiliate"]),
                TemplateEntry::new("Parts of this video were created with AI assistance.")
                    .with_categories(&["ai"])
                    .with_weight(2.0),
                TemplateEntry::new("#AIGenerated This narration uses AI voice.")
                    .with_categories(&["ai"]),
                TemplateEntry::new("This content is for information only, not medical advice.")
                    .with_categories(&["supplement", "chronic_fatigue", "sleep", "gut_health"])
                    .with_weight(1.5),
            ],
        );

        pools.insert(
            PoolKind::HashtagBases,
            vec![
                TemplateEntry::new("#fyp").with_weight(3.0),
                TemplateEntry::new("#foryou").with_weight(2.5),
                TemplateEntry::new("#viral").with_weight(2.0),
                TemplateEntry::new("#tiktokmademebuyit")
                    .with_weight(2.2)
                    .with_categories(&["product", "supplement", "home_gadgets", "affiliate"]),
                TemplateEntry::new("#storytime")
                    .with_weight(2.0)
                    .with_categories(&["drama", "horror", "revenge", "mystery", "wholesome"]),
                TemplateEntry::new("#wellness")
                    .with_weight(1.8)
                    .with_categories(&["supplement", "chronic_fatigue", "sleep", "gut_health"]),
                TemplateEntry::new("#guthealth")
                    .with_weight(1.6)
                    .with_categories(&["gut_health", "supplement"]),
                TemplateEntry::new("#energy")
                    .with_weight(1.5)
                    .with_categories(&["chronic_fatigue", "supplement"]),
                TemplateEntry::new("#sleeptok")
                    .with_weight(1.5)
                    .with_categories(&["sleep", "supplement"]),
                TemplateEntry::new("#learnontiktok").with_weight(1.4),
            ],
        );

        TemplateRegistry::new(pools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_has_every_pool() {
        let reg = TemplateRegistry::builtin();
        for &kind in PoolKind::all() {
            assert!(!reg.pool(kind).is_empty(), "{:?} pool empty", kind);
        }
    }

    #[test]
    fn test_builtin_serves_unknown_categories() {
        // Generic entries must cover categories the corpus never names.
        let reg = TemplateRegistry::builtin();
        let mut rng = StdRng::seed_from_u64(5);
        for kind in [
            PoolKind::Hooks,
            PoolKind::EmotionalTriggers,
            PoolKind::PainAmplifiers,
            PoolKind::AuthorityMarkers,
            PoolKind::Ctas,
        ] {
            assert!(reg.select(kind, "underwater_basket_weaving", &mut rng).is_ok());
        }
    }

    #[test]
    fn test_builtin_has_enough_generic_hooks() {
        let reg = TemplateRegistry::builtin();
        let generic = reg
            .pool(PoolKind::Hooks)
            .iter()
            .filter(|e| e.categories.is_empty())
            .count();
        assert!(generic >= 5, "need at least 5 generic hooks, got {}", generic);
    }
}
