//! Built-in output templates.
//!
//! Registered by name at renderer construction. These render operator-facing
//! text, not spoken script; the script corpus lives in the registry crate.

pub const CAPTION: &str = "{{truncate hook 120}} {{join hashtags \" \"}}";

pub const BUSINESS_RATIONALE: &str = "{{title strategy}} path chosen: {{reason}}. \
Estimated viral score {{viral_score}}/100 at {{word_count}} words.";

pub const OVERLAY_DISCLOSURE: &str = "Commissions may be earned from links in this video.";

pub const OVERLAY_AI: &str = "Contains AI-generated narration.";

/// (template name, template body) pairs registered at startup.
pub const ALL: &[(&str, &str)] = &[
    ("caption", CAPTION),
    ("business_rationale", BUSINESS_RATIONALE),
];

/// Advisory posting windows per platform, local account time.
pub fn posting_window(platform: &str) -> &'static str {
    match platform {
        "tiktok" => "18:00-21:00 Tue-Thu, local audience time",
        "instagram_reels" => "11:00-13:00 or 19:00-21:00, local audience time",
        "youtube_shorts" => "12:00-15:00 weekends, local audience time",
        _ => "18:00-21:00, local audience time",
    }
}

/// Evergreen posting tips, filtered by strategy where it matters.
pub fn posting_tips(strategy_tag: &str) -> Vec<String> {
    let mut tips = vec![
        "Reply to the first 10 comments within the hour".to_string(),
        "Pin a comment restating the call to action".to_string(),
        "Do not delete and repost; edit the caption instead".to_string(),
    ];
    match strategy_tag {
        "ugc_variations" => tips.push(
            "Stagger variation posts at least 6 hours apart".to_string(),
        ),
        "supplement_viral" => tips.push(
            "Keep claims soft; let the testimonial carry the video".to_string(),
        ),
        "authority_human" => tips.push(
            "Cross-post the avatar cut to the brand account".to_string(),
        ),
        _ => {}
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_platform_has_a_window() {
        for platform in ["tiktok", "instagram_reels", "youtube_shorts", "unknown"] {
            assert!(!posting_window(platform).is_empty());
        }
    }

    #[test]
    fn test_tips_vary_by_strategy() {
        let ugc = posting_tips("ugc_variations");
        let edu = posting_tips("educational");
        assert!(ugc.len() > edu.len());
    }
}
