//! Account metric samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point-in-time capture of an account's measured signals. Samples are
/// appended to a per-account stream and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMetricsSample {
    pub account_id: String,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub views: f64,
    #[serde(default)]
    pub likes: f64,
    #[serde(default)]
    pub comments: f64,
    #[serde(default)]
    pub shares: f64,
    #[serde(default)]
    pub followers: f64,
    #[serde(default)]
    pub fyp_appearances: f64,
    #[serde(default)]
    pub reach: f64,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub video_count: f64,
}

impl AccountMetricsSample {
    pub fn new(account_id: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            account_id: account_id.into(),
            captured_at,
            views: 0.0,
            likes: 0.0,
            comments: 0.0,
            shares: 0.0,
            followers: 0.0,
            fyp_appearances: 0.0,
            reach: 0.0,
            engagement_rate: 0.0,
            video_count: 0.0,
        }
    }

    pub fn with_views(mut self, views: f64) -> Self {
        self.views = views;
        self
    }

    pub fn with_reach(mut self, reach: f64) -> Self {
        self.reach = reach;
        self
    }

    pub fn with_engagement(mut self, rate: f64) -> Self {
        self.engagement_rate = rate;
        self
    }

    pub fn with_fyp(mut self, appearances: f64) -> Self {
        self.fyp_appearances = appearances;
        self
    }

    /// Fraction of views arriving via the For You page, when both are known.
    pub fn fyp_fraction(&self) -> Option<f64> {
        if self.views > 0.0 && self.fyp_appearances > 0.0 {
            Some(self.fyp_appearances / self.views)
        } else {
            None
        }
    }
}
