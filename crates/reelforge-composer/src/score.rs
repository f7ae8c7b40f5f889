//! Viral-score prediction.
//!
//! Advisory 0..100 estimate of short-form performance. A weighted sum of
//! template calibration, category calibration, length, and keyword density.
//! Deterministic over its inputs; the absolute value gates nothing.

use crate::config::ComposerConfig;
use reelforge_core::Script;

pub(crate) struct ScoreInputs<'a> {
    pub script: &'a Script,
    pub category: &'a str,
    pub hook_weight: f32,
    pub cta_weight: f32,
}

pub(crate) fn predict(config: &ComposerConfig, inputs: &ScoreInputs) -> u32 {
    let text = inputs.script.full_text().to_lowercase();
    let mut score = 0u32;

    // Template calibration: the hook carries most of the watch-through.
    let hook = (inputs.hook_weight * config.hook_weight_scale) as u32;
    score += hook.min(config.hook_score_cap);

    score += config
        .category_weights
        .get(inputs.category)
        .copied()
        .unwrap_or(config.default_category_weight);

    let words = inputs.script.word_count;
    if words >= config.optimal_words.0 && words <= config.optimal_words.1 {
        score += config.optimal_length_bonus;
    }

    let viral_hits = count_hits(&text, &config.viral_keywords).min(config.viral_keyword_cap);
    score += viral_hits * config.viral_keyword_points;

    let emotional_hits =
        count_hits(&text, &config.emotional_keywords).min(config.emotional_keyword_cap);
    score += emotional_hits * config.emotional_keyword_points;

    if inputs.cta_weight >= config.strong_cta_weight {
        score += config.strong_cta_bonus;
    } else {
        score += config.weak_cta_bonus;
    }

    score.min(100)
}

fn count_hits(text: &str, keywords: &[String]) -> u32 {
    keywords.iter().filter(|k| text.contains(k.as_str())).count() as u32
}
