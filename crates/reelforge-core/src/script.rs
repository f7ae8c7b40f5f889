//! Scripts and segments.

use serde::{Deserialize, Serialize};

/// Words-per-minute used for the spoken-duration estimate.
pub const SPEECH_WORDS_PER_MINUTE: f32 = 150.0;

/// Narrative role of a segment inside the script structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentRole {
    Hook,
    Opening,
    Revelation,
    Context,
    Consequence,
    Cta,
    Disclosure,
}

impl SegmentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentRole::Hook => "hook",
            SegmentRole::Opening => "opening",
            SegmentRole::Revelation => "revelation",
            SegmentRole::Context => "context",
            SegmentRole::Consequence => "consequence",
            SegmentRole::Cta => "cta",
            SegmentRole::Disclosure => "disclosure",
        }
    }
}

/// One timed block of the script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub role: SegmentRole,
    pub text: String,
    /// Emotional tone label, e.g. "urgent", "reassuring".
    pub tone: String,
    pub start_s: f32,
    pub duration_s: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
}

/// A fully assembled script ready for compliance audit and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub segments: Vec<Segment>,
    /// Ordered, deduplicated, capped at the configured maximum.
    pub hashtags: Vec<String>,
    pub estimated_duration_s: f32,
    pub word_count: u32,
    /// Advisory 0..100 prediction; never gates anything.
    pub viral_score: u32,
}

impl Script {
    /// Concatenated spoken text, segment order preserved.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn count_words(text: &str) -> u32 {
        text.split_whitespace().count() as u32
    }

    /// Spoken-duration estimate from word count.
    pub fn estimate_duration_s(word_count: u32) -> f32 {
        word_count as f32 / SPEECH_WORDS_PER_MINUTE * 60.0
    }

    pub fn segment(&self, role: SegmentRole) -> Option<&Segment> {
        self.segments.iter().find(|s| s.role == role)
    }

    /// Content hash for determinism checks and artifact identity.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for seg in &self.segments {
            hasher.update(seg.text.as_bytes());
            hasher.update(b"\n");
        }
        for tag in &self.hashtags {
            hasher.update(tag.as_bytes());
            hasher.update(b",");
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Script {
        Script {
            segments: vec![
                Segment {
                    role: SegmentRole::Hook,
                    text: "Stop scrolling right now".into(),
                    tone: "urgent".into(),
                    start_s: 0.0,
                    duration_s: 3.0,
                    delivery_notes: None,
                },
                Segment {
                    role: SegmentRole::Cta,
                    text: "Link in bio".into(),
                    tone: "direct".into(),
                    start_s: 27.0,
                    duration_s: 3.0,
                    delivery_notes: None,
                },
            ],
            hashtags: vec!["#fyp".into()],
            estimated_duration_s: 2.8,
            word_count: 7,
            viral_score: 50,
        }
    }

    #[test]
    fn test_full_text_preserves_order() {
        assert_eq!(sample().full_text(), "Stop scrolling right now Link in bio");
    }

    #[test]
    fn test_duration_estimate() {
        // 150 words at 150 wpm is exactly a minute.
        assert!((Script::estimate_duration_s(150) - 60.0).abs() < f32::EPSILON);
        assert!((Script::estimate_duration_s(75) - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_content_hash_tracks_text() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.content_hash(), b.content_hash());
        b.segments[0].text.push('!');
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
