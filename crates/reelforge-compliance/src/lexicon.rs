//! Compliance lexicons.
//!
//! Curated phrase lists the audit rules match against. These are policy
//! data, kept in one place so legal review has a single file to sign off.

use once_cell::sync::Lazy;

/// Curative / medical-claim phrases that must not appear, each paired with
/// safe replacement language.
pub static AVOID_LANGUAGE: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("cures", "may support"),
        ("cure for", "support for"),
        ("heals", "may help with"),
        ("guaranteed results", "results may vary"),
        ("clinically proven to cure", "studied for"),
        ("miracle", "promising"),
        ("eliminates disease", "supports wellness"),
        ("treats cancer", "discussed with your doctor"),
        ("fixes your", "may support your"),
        ("instant weight loss", "gradual change"),
    ]
});

/// Red-flag phrases that force an immediate block regardless of anything
/// else in the script.
pub static RED_FLAGS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "cures cancer",
        "vaccines cause",
        "don't vaccinate",
        "stop taking your medication",
        "you don't need a doctor",
        "chemotherapy is a scam",
        "drink bleach",
        "unregulated peptides",
        "government is hiding the cure",
        "5g causes",
        "detox replaces treatment",
    ]
});

/// Tokens that satisfy the paid-promotion disclosure requirement when they
/// appear in the caption or hashtag set.
pub static DISCLOSURE_TOKENS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["#ad", "#sponsored", "#affiliate", "paid partnership", "commission earned"]
});

/// Markers that satisfy the AI-assistance disclosure requirement.
pub static AI_MARKERS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "#aigenerated",
        "ai-generated",
        "ai generated",
        "created with ai",
        "ai assistance",
        "ai voice",
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avoid_language_has_replacements() {
        for (avoid, safe) in AVOID_LANGUAGE.iter() {
            assert!(!avoid.is_empty());
            assert!(!safe.is_empty());
            assert_ne!(avoid, safe);
        }
    }

    #[test]
    fn test_lexicons_are_lowercase() {
        // Matching lowercases the text once; the lexicons must already be
        // lowercase or entries silently never match.
        for (avoid, _) in AVOID_LANGUAGE.iter() {
            assert_eq!(*avoid, avoid.to_lowercase());
        }
        for flag in RED_FLAGS.iter() {
            assert_eq!(*flag, flag.to_lowercase());
        }
        for marker in AI_MARKERS.iter() {
            assert_eq!(*marker, marker.to_lowercase());
        }
    }
}
