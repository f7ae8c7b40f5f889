//! Composer tunables.
//!
//! The score weights are calibrated numbers carried over from production
//! observation; they are configuration, and only determinism is contractual.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Word-count band that earns the optimal-length bonus.
    pub optimal_words: (u32, u32),
    pub optimal_length_bonus: u32,
    /// Per-keyword points and occurrence cap for viral keywords.
    pub viral_keyword_points: u32,
    pub viral_keyword_cap: u32,
    pub emotional_keyword_points: u32,
    pub emotional_keyword_cap: u32,
    /// CTA templates at or above this weight earn the strong bonus.
    pub strong_cta_weight: f32,
    pub strong_cta_bonus: u32,
    pub weak_cta_bonus: u32,
    /// Multiplier applied to the hook template weight, and its cap.
    pub hook_weight_scale: f32,
    pub hook_score_cap: u32,
    /// Calibrated per-category contribution; unknown categories use the default.
    pub category_weights: HashMap<String, u32>,
    pub default_category_weight: u32,
    pub viral_keywords: Vec<String>,
    pub emotional_keywords: Vec<String>,
    /// Hashtag list ceiling on every emitted script.
    pub hashtag_max: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        let category_weights = [
            ("supplement", 18u32),
            ("chronic_fatigue", 16),
            ("sleep", 14),
            ("gut_health", 14),
            ("drama", 15),
            ("revenge", 15),
            ("horror", 13),
            ("mystery", 12),
            ("wholesome", 10),
            ("home_gadgets", 12),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            optimal_words: (150, 200),
            optimal_length_bonus: 15,
            viral_keyword_points: 3,
            viral_keyword_cap: 5,
            emotional_keyword_points: 2,
            emotional_keyword_cap: 5,
            strong_cta_weight: 2.0,
            strong_cta_bonus: 10,
            weak_cta_bonus: 5,
            hook_weight_scale: 10.0,
            hook_score_cap: 25,
            category_weights,
            default_category_weight: 10,
            viral_keywords: [
                "secret", "nobody", "shocking", "banned", "exposed", "truth", "hack",
                "instantly", "wild", "finally",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            emotional_keywords: [
                "broke", "crying", "unbelievable", "fault", "worse", "love", "fear",
                "alone", "tired", "hope",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            hashtag_max: 20,
        }
    }
}
