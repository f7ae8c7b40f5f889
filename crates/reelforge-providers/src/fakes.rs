//! In-memory fake adapters.
//!
//! Deterministic stand-ins used by tests and credential-less deployments.
//! The fakes never sleep unless configured to, so test suites stay fast.

use crate::error::ProviderError;
use crate::traits::{
    MarketData, RenderConfig, RenderHandle, RenderState, ScriptEnhancer, SocialScraper, StorySeed,
    VideoRenderer, VoiceSynthesizer,
};
use async_trait::async_trait;
use reelforge_core::{MediaKind, MediaRef, ProviderId, Script, Seed, SeedSignals};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Enhancer that tightens the text deterministically: trims whitespace and
/// appends a punch marker to the hook so tests can see it ran.
#[derive(Debug, Default)]
pub struct EchoEnhancer {
    calls: AtomicU32,
}

impl EchoEnhancer {
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptEnhancer for EchoEnhancer {
    fn id(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn estimate(&self, script: &Script) -> (f64, u64) {
        (0.03, script.word_count as u64 * 4)
    }

    async fn enhance(&self, script: &Script, _seed: &Seed) -> Result<Script, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut out = script.clone();
        for seg in &mut out.segments {
            seg.text = seg.text.trim().to_string();
        }
        if let Some(hook) = out.segments.first_mut() {
            if !hook.text.ends_with('!') {
                hook.text.push('!');
            }
        }
        out.word_count = Script::count_words(&out.full_text());
        out.estimated_duration_s = Script::estimate_duration_s(out.word_count);
        Ok(out)
    }
}

/// Enhancer that fails a configured number of times before succeeding.
/// Used to exercise the retry policy.
#[derive(Debug)]
pub struct FlakyEnhancer {
    failures_remaining: AtomicU32,
    /// When true the failures are permanent (auth) instead of transient.
    permanent: bool,
}

impl FlakyEnhancer {
    pub fn transient(failures: u32) -> Self {
        Self { failures_remaining: AtomicU32::new(failures), permanent: false }
    }

    pub fn permanent() -> Self {
        Self { failures_remaining: AtomicU32::new(u32::MAX), permanent: true }
    }
}

#[async_trait]
impl ScriptEnhancer for FlakyEnhancer {
    fn id(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn estimate(&self, script: &Script) -> (f64, u64) {
        (0.03, script.word_count as u64 * 4)
    }

    async fn enhance(&self, script: &Script, _seed: &Seed) -> Result<Script, ProviderError> {
        if self.permanent {
            return Err(ProviderError::Auth("api key rejected".into()));
        }
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(ProviderError::Status { status: 503, detail: "upstream busy".into() });
        }
        Ok(script.clone())
    }
}

/// Voice adapter that returns a handle immediately.
#[derive(Debug, Default)]
pub struct InstantVoice;

#[async_trait]
impl VoiceSynthesizer for InstantVoice {
    fn id(&self) -> ProviderId {
        ProviderId::Elevenlabs
    }

    fn estimate(&self, script: &Script) -> (f64, u64) {
        // Voice pricing tracks character count, not tokens.
        (script.full_text().len() as f64 * 0.00003, 0)
    }

    async fn synthesize(&self, script: &Script, voice_id: &str) -> Result<MediaRef, ProviderError> {
        Ok(MediaRef {
            kind: MediaKind::Voiceover,
            provider: self.id(),
            locator: format!("fake://voice/{}/{}", voice_id, script.content_hash()),
        })
    }
}

/// Video renderer that completes after a configurable number of polls.
pub struct StubRenderer {
    id: ProviderId,
    trust: f32,
    variations: bool,
    polls_to_complete: u32,
    poll_counts: Mutex<HashMap<String, u32>>,
}

impl StubRenderer {
    pub fn new(id: ProviderId, trust: f32, variations: bool) -> Self {
        Self {
            id,
            trust,
            variations,
            polls_to_complete: 2,
            poll_counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn heygen() -> Self {
        Self::new(ProviderId::Heygen, 0.9, false)
    }

    pub fn arcads() -> Self {
        Self::new(ProviderId::Arcads, 0.75, true)
    }

    pub fn shotstack() -> Self {
        Self::new(ProviderId::Shotstack, 0.6, true)
    }

    pub fn with_polls(mut self, polls: u32) -> Self {
        self.polls_to_complete = polls;
        self
    }
}

#[async_trait]
impl VideoRenderer for StubRenderer {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn supports_variations(&self) -> bool {
        self.variations
    }

    fn trust_factor(&self) -> f32 {
        self.trust
    }

    fn estimate(&self, config: &RenderConfig) -> (f64, u64) {
        (0.05 * config.duration_s as f64, 0)
    }

    async fn start_render(
        &self,
        script: &Script,
        _config: &RenderConfig,
    ) -> Result<RenderHandle, ProviderError> {
        let handle = format!("{}-{}", self.id, script.content_hash());
        self.poll_counts.lock().unwrap().insert(handle.clone(), 0);
        Ok(RenderHandle(handle))
    }

    async fn poll(&self, handle: &RenderHandle) -> Result<RenderState, ProviderError> {
        let mut counts = self.poll_counts.lock().unwrap();
        let count = counts
            .get_mut(&handle.0)
            .ok_or_else(|| ProviderError::BadPayload(format!("unknown render {}", handle.0)))?;
        *count += 1;
        if *count >= self.polls_to_complete {
            Ok(RenderState::Complete(MediaRef {
                kind: MediaKind::Video,
                provider: self.id,
                locator: format!("fake://video/{}", handle.0),
            }))
        } else {
            let percent = (*count * 100 / self.polls_to_complete.max(1)) as u8;
            Ok(RenderState::InProgress { percent })
        }
    }
}

/// Scraper with a canned story per known category.
#[derive(Debug, Default)]
pub struct CannedScraper;

const STORY_CATEGORIES: &[(&str, &str, &str)] = &[
    (
        "drama",
        "My roommate sold my furniture while I was away",
        "Came back from a two week trip and the living room was empty. She said she thought I moved out.",
    ),
    (
        "horror",
        "The night shift at the old mill",
        "Security cameras kept picking up movement on a floor that has been sealed for years.",
    ),
    (
        "revenge",
        "HOA fined me for my garden, so I read the bylaws",
        "Turns out their own signage violated three clauses. I filed every complaint in writing.",
    ),
    (
        "wholesome",
        "Retired teacher funds a student's bus pass for a year",
        "He noticed she walked two hours each way and quietly covered the route pass.",
    ),
    (
        "mystery",
        "The letters kept arriving for a man who never lived here",
        "Forty years of postmarks, one per year, always on the same date.",
    ),
];

#[async_trait]
impl SocialScraper for CannedScraper {
    fn id(&self) -> ProviderId {
        ProviderId::Reddit
    }

    async fn scrape_stories(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<StorySeed>, ProviderError> {
        let matching: Vec<StorySeed> = STORY_CATEGORIES
            .iter()
            .filter(|(cat, _, _)| *cat == category)
            .flat_map(|(cat, title, content)| {
                (0..limit).map(move |i| StorySeed {
                    id: format!("{}-{}", cat, i),
                    title: title.to_string(),
                    content: content.to_string(),
                    category: cat.to_string(),
                    score: 1000 + i as u64,
                })
            })
            .collect();
        if matching.is_empty() {
            return Err(ProviderError::BadPayload(format!("unknown category {}", category)));
        }
        Ok(matching)
    }
}

/// Market data source with fixed signals keyed by product-name hints.
#[derive(Debug, Default)]
pub struct CannedMarketData;

#[async_trait]
impl MarketData for CannedMarketData {
    fn id(&self) -> ProviderId {
        ProviderId::Fastmoss
    }

    async fn product_signals(&self, product: &str) -> Result<SeedSignals, ProviderError> {
        let lower = product.to_lowercase();
        let revenue = if lower.contains("supplement") || lower.contains("gummies") {
            18_000.0
        } else if lower.contains("led") || lower.contains("gadget") {
            6_500.0
        } else {
            1_200.0
        };
        Ok(SeedSignals {
            revenue_potential: Some(revenue),
            commission_rate: Some(0.12),
            search_volume: Some(40_000),
            affiliate_link: true,
            ai_assisted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelforge_core::{Segment, SegmentRole};

    fn script() -> Script {
        Script {
            segments: vec![Segment {
                role: SegmentRole::Hook,
                text: "  Watch this  ".into(),
                tone: "urgent".into(),
                start_s: 0.0,
                duration_s: 3.0,
                delivery_notes: None,
            }],
            hashtags: vec![],
            estimated_duration_s: 0.8,
            word_count: 2,
            viral_score: 40,
        }
    }

    #[tokio::test]
    async fn test_echo_enhancer_is_deterministic() {
        let enhancer = EchoEnhancer::default();
        let seed = Seed::new(reelforge_core::SeedKind::Topic, "sleep", "Sleep");
        let a = enhancer.enhance(&script(), &seed).await.unwrap();
        let b = enhancer.enhance(&script(), &seed).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.segments[0].text, "Watch this!");
        assert_eq!(enhancer.call_count(), 2);
    }

    #[tokio::test]
    async fn test_flaky_enhancer_recovers() {
        let enhancer = FlakyEnhancer::transient(1);
        let seed = Seed::new(reelforge_core::SeedKind::Topic, "sleep", "Sleep");
        assert!(enhancer.enhance(&script(), &seed).await.is_err());
        assert!(enhancer.enhance(&script(), &seed).await.is_ok());
    }

    #[tokio::test]
    async fn test_stub_renderer_completes_after_polls() {
        let renderer = StubRenderer::heygen().with_polls(2);
        let config = RenderConfig { duration_s: 30.0, add_captions: true, background_url: None };
        let handle = renderer.start_render(&script(), &config).await.unwrap();

        match renderer.poll(&handle).await.unwrap() {
            RenderState::InProgress { percent } => assert!(percent < 100),
            RenderState::Complete(_) => panic!("completed too early"),
        }
        match renderer.poll(&handle).await.unwrap() {
            RenderState::Complete(media) => {
                assert_eq!(media.provider, ProviderId::Heygen);
            }
            RenderState::InProgress { .. } => panic!("should be complete"),
        }
    }

    #[tokio::test]
    async fn test_canned_scraper_known_and_unknown() {
        let scraper = CannedScraper;
        let stories = scraper.scrape_stories("drama", 3).await.unwrap();
        assert_eq!(stories.len(), 3);
        assert!(scraper.scrape_stories("gossip", 3).await.is_err());
    }
}
