//! Pools and the weighted selector.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use thiserror::Error;

/// Which pool a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Hooks,
    EmotionalTriggers,
    PainAmplifiers,
    AuthorityMarkers,
    Ctas,
    Disclosures,
    HashtagBases,
}

impl PoolKind {
    pub fn all() -> &'static [PoolKind] {
        &[
            PoolKind::Hooks,
            PoolKind::EmotionalTriggers,
            PoolKind::PainAmplifiers,
            PoolKind::AuthorityMarkers,
            PoolKind::Ctas,
            PoolKind::Disclosures,
            PoolKind::HashtagBases,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::Hooks => "hooks",
            PoolKind::EmotionalTriggers => "emotional_triggers",
            PoolKind::PainAmplifiers => "pain_amplifiers",
            PoolKind::AuthorityMarkers => "authority_markers",
            PoolKind::Ctas => "ctas",
            PoolKind::Disclosures => "disclosures",
            PoolKind::HashtagBases => "hashtag_bases",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.as_str() == key)
    }
}

/// One template with its calibrated weight and category filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub text: String,
    /// Calibrated selection weight; also feeds the viral-score prediction.
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Empty means the template applies to every category.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

fn default_weight() -> f32 {
    1.0
}

impl TemplateEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), weight: 1.0, categories: Vec::new(), tone: None }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    fn matches(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("pool {kind:?} has no templates for category '{category}'")]
    EmptyPool { kind: PoolKind, category: String },

    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("corpus parse: {0}")]
    Parse(String),
}

/// The registry. Pools are immutable after construction; the anti-repetition
/// window is the only mutable state.
#[derive(Debug)]
pub struct TemplateRegistry {
    pools: HashMap<PoolKind, Vec<TemplateEntry>>,
    window: usize,
    recent: Mutex<HashMap<(PoolKind, String), VecDeque<usize>>>,
}

impl TemplateRegistry {
    pub fn new(pools: HashMap<PoolKind, Vec<TemplateEntry>>) -> Self {
        Self { pools, window: 3, recent: Mutex::new(HashMap::new()) }
    }

    /// Suppress the last `window` picks per (pool, category). Zero disables.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn pool(&self, kind: PoolKind) -> &[TemplateEntry] {
        self.pools.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Weighted seeded selection, suppressing recent picks.
    ///
    /// Falls back to the full candidate list when suppression would leave
    /// nothing to pick from.
    pub fn select(
        &self,
        kind: PoolKind,
        category: &str,
        rng: &mut StdRng,
    ) -> Result<TemplateEntry, RegistryError> {
        let pool = self.pool(kind);
        let candidates: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(category))
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return Err(RegistryError::EmptyPool { kind, category: category.to_string() });
        }

        let mut recent = self.recent.lock().unwrap();
        let seen = recent
            .entry((kind, category.to_string()))
            .or_default();
        let fresh: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|i| !seen.contains(i))
            .collect();
        let eligible = if fresh.is_empty() { &candidates } else { &fresh };

        let total: f32 = eligible.iter().map(|&i| pool[i].weight.max(0.0)).sum();
        let picked = if total <= 0.0 {
            eligible[rng.gen_range(0..eligible.len())]
        } else {
            let mut roll = rng.gen_range(0.0..total);
            let mut choice = eligible[eligible.len() - 1];
            for &i in eligible {
                let w = pool[i].weight.max(0.0);
                if roll < w {
                    choice = i;
                    break;
                }
                roll -= w;
            }
            choice
        };

        if self.window > 0 {
            seen.push_back(picked);
            while seen.len() > self.window {
                seen.pop_front();
            }
        }
        Ok(pool[picked].clone())
    }

    /// All hashtag-base texts matching the category, highest weight first.
    pub fn hashtag_bases(&self, category: &str) -> Vec<String> {
        let mut entries: Vec<&TemplateEntry> = self
            .pool(PoolKind::HashtagBases)
            .iter()
            .filter(|e| e.matches(category))
            .collect();
        entries.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));
        entries.iter().map(|e| e.text.clone()).collect()
    }
}

impl Clone for TemplateRegistry {
    /// Clones pools and the current anti-repetition window, so a clone is a
    /// true snapshot of selection state.
    fn clone(&self) -> Self {
        Self {
            pools: self.pools.clone(),
            window: self.window,
            recent: Mutex::new(self.recent.lock().unwrap().clone()),
        }
    }
}
