//! Deterministic template fallback.
//!
//! When the enhancement provider is missing, over quota, or permanently
//! failing, the pipeline substitutes this category-keyed
//! hook + original content + CTA script. No randomness and no provider
//! spend; the same seed always produces the same fallback.

use reelforge_core::{Script, Seed, Segment, SegmentRole};

/// Category-keyed hook line.
fn hook_for(category: &str, title: &str) -> String {
    match category {
        "supplement" | "chronic_fatigue" | "sleep" | "gut_health" => {
            format!("Still pushing through {}? Watch this first.", category.replace('_', " "))
        }
        "drama" | "revenge" | "mystery" | "horror" | "wholesome" => {
            "This story kept the whole comment section up at night.".to_string()
        }
        _ => format!("Three things nobody tells you about {}.", title),
    }
}

fn cta_for(category: &str) -> &'static str {
    match category {
        "drama" | "revenge" | "mystery" | "horror" | "wholesome" => {
            "Follow for part two."
        }
        _ => "Check the link in bio for more.",
    }
}

/// Build the fallback script for a seed. Three fixed segments timed as
/// 3 s hook, body, 3 s CTA within the target duration.
pub fn fallback_script(seed: &Seed, target_duration_s: f32) -> Script {
    let body_source = if seed.text.trim().is_empty() { &seed.title } else { &seed.text };
    let hook = hook_for(&seed.category, &seed.title);
    let cta = cta_for(&seed.category).to_string();

    let hook_len = 3.0f32.min(target_duration_s / 3.0);
    let cta_len = 3.0f32.min(target_duration_s / 3.0);
    let body_len = (target_duration_s - hook_len - cta_len).max(1.0);

    let segments = vec![
        Segment {
            role: SegmentRole::Hook,
            text: hook,
            tone: "urgent".into(),
            start_s: 0.0,
            duration_s: hook_len,
            delivery_notes: None,
        },
        Segment {
            role: SegmentRole::Context,
            text: body_source.trim().to_string(),
            tone: "narrative".into(),
            start_s: hook_len,
            duration_s: body_len,
            delivery_notes: None,
        },
        Segment {
            role: SegmentRole::Cta,
            text: cta,
            tone: "direct".into(),
            start_s: hook_len + body_len,
            duration_s: cta_len,
            delivery_notes: None,
        },
    ];

    let full_text: String = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let word_count = Script::count_words(&full_text);

    let mut hashtags = vec!["#fyp".to_string(), "#foryou".to_string()];
    if seed.signals.affiliate_link {
        hashtags.insert(0, "#ad".to_string());
    }
    if seed.signals.ai_assisted {
        hashtags.push("#AIGenerated".to_string());
    }

    Script {
        segments,
        hashtags,
        estimated_duration_s: Script::estimate_duration_s(word_count),
        word_count,
        // Template-only scripts score conservatively.
        viral_score: 35,
    }
}
