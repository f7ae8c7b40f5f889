//! Wire types for the HTTP surface and their mapping onto the core model.

use reelforge_core::{GenerationRequest, Seed, SeedKind};
use serde::Deserialize;
use serde_json::json;

/// POST /content/generate request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGenerateBody {
    /// e.g. "viral-affiliate", "viral-growth-conspiracy".
    pub content_type: String,
    #[serde(default)]
    pub business_model: Option<String>,
    #[serde(default)]
    pub target_product: Option<String>,
    #[serde(default)]
    pub call_to_action: Option<String>,
    #[serde(default)]
    pub variation_seed: Option<u64>,
    #[serde(default)]
    pub use_real_data: Option<bool>,
    /// Raw story or topic text when no product is targeted.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl ContentGenerateBody {
    /// Shape the wire body into a validated-later generation request.
    pub fn into_request(self) -> GenerationRequest {
        let affiliate = self.content_type.contains("affiliate")
            || self
                .business_model
                .as_deref()
                .map(|b| b.contains("affiliate"))
                .unwrap_or(false);
        let category = self
            .category
            .clone()
            .unwrap_or_else(|| self.content_type.replace('-', "_"));

        let (kind, title, text) = match (&self.target_product, &self.content) {
            (Some(product), content) => (
                SeedKind::Product,
                product.clone(),
                content.clone().unwrap_or_default(),
            ),
            (None, Some(content)) => {
                (SeedKind::Story, self.content_type.replace('-', " "), content.clone())
            }
            (None, None) => (SeedKind::Topic, self.content_type.replace('-', " "), String::new()),
        };

        let mut seed = Seed::new(kind, category, title).with_text(text);
        seed.signals.affiliate_link = affiliate;
        if let Some(cta) = &self.call_to_action {
            seed.extras.insert("call_to_action".to_string(), json!(cta));
        }

        let mut request =
            GenerationRequest::new(seed).with_variation_seed(self.variation_seed.unwrap_or(0));
        if let Some(account) = self.account_id {
            request = request.with_account(account);
        }
        request.idempotency_key = self.idempotency_key;
        request
    }
}

/// POST /reddit/scrape request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeBody {
    pub category: String,
    #[serde(default = "default_scrape_limit")]
    pub limit: usize,
}

fn default_scrape_limit() -> usize {
    5
}

pub const SCRAPE_CATEGORIES: &[&str] = &["drama", "horror", "revenge", "wholesome", "mystery"];

/// POST /video/generate request body.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoGenerateBody {
    pub story: StoryBody,
    #[serde(default)]
    pub background_url: Option<String>,
    #[serde(default)]
    pub voice_settings: Option<VoiceSettings>,
    #[serde(default)]
    pub video_config: Option<VideoConfigBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryBody {
    #[serde(default)]
    pub id: Option<String>,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceSettings {
    #[serde(default)]
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfigBody {
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub add_captions: Option<bool>,
}

impl VideoGenerateBody {
    pub fn into_request(self) -> GenerationRequest {
        let title = self
            .story
            .id
            .clone()
            .unwrap_or_else(|| format!("{} story", self.story.category));
        let mut seed =
            Seed::new(SeedKind::Story, self.story.category.clone(), title).with_text(self.story.content);
        if let Some(url) = &self.background_url {
            seed.extras.insert("background_url".to_string(), json!(url));
        }

        let mut request = GenerationRequest::new(seed);
        if let Some(config) = &self.video_config {
            if let Some(duration) = config.duration {
                request.target_duration_s = duration;
            }
            if let Some(captions) = config.add_captions {
                request.captions = captions;
            }
        }
        request.voice_id = self.voice_settings.and_then(|v| v.voice_id);
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_body_maps_to_product_seed() {
        let body = ContentGenerateBody {
            content_type: "viral-affiliate".into(),
            business_model: None,
            target_product: Some("LED Strip Lights".into()),
            call_to_action: None,
            variation_seed: Some(7),
            use_real_data: None,
            content: None,
            category: None,
            account_id: None,
            idempotency_key: None,
        };
        let request = body.into_request();
        assert_eq!(request.seed.kind, SeedKind::Product);
        assert_eq!(request.seed.title, "LED Strip Lights");
        assert!(request.seed.signals.affiliate_link);
        assert_eq!(request.variation_seed, 7);
        assert_eq!(request.seed.category, "viral_affiliate");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_story_body_maps_to_story_seed() {
        let body = ContentGenerateBody {
            content_type: "story-drama".into(),
            business_model: None,
            target_product: None,
            call_to_action: None,
            variation_seed: None,
            use_real_data: None,
            content: Some("She sold my couch.".into()),
            category: Some("drama".into()),
            account_id: None,
            idempotency_key: None,
        };
        let request = body.into_request();
        assert_eq!(request.seed.kind, SeedKind::Story);
        assert_eq!(request.seed.category, "drama");
        assert!(!request.seed.signals.affiliate_link);
    }

    #[test]
    fn test_video_body_carries_config() {
        let body = VideoGenerateBody {
            story: StoryBody {
                id: Some("abc".into()),
                content: "A long night at the mill.".into(),
                category: "horror".into(),
            },
            background_url: Some("https://cdn.example/bg.mp4".into()),
            voice_settings: Some(VoiceSettings { voice_id: Some("deep_narrator".into()) }),
            video_config: Some(VideoConfigBody { duration: Some(45.0), add_captions: Some(true) }),
        };
        let request = body.into_request();
        assert_eq!(request.target_duration_s, 45.0);
        assert!(request.captions);
        assert_eq!(request.voice_id.as_deref(), Some("deep_narrator"));
        assert_eq!(
            request.seed.extras["background_url"],
            serde_json::json!("https://cdn.example/bg.mp4")
        );
    }
}
