//! Script assembly.

use crate::config::ComposerConfig;
use crate::score::{self, ScoreInputs};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reelforge_core::{
    Intensity, OrchestratorError, Script, Seed, SeedKind, Segment, SegmentRole, Strategy,
};
use reelforge_registry::{instantiate, PoolKind, RegistryError, TemplateRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// Relative timing weight per role. Normalized across the roles actually
/// present, these reproduce the canonical 30 s buckets
/// (0–3 hook, 3–8, 8–15, 15–22, 22–27, 27–30).
fn timing_weight(role: SegmentRole) -> f32 {
    match role {
        SegmentRole::Hook => 3.0,
        SegmentRole::Opening => 5.0,
        SegmentRole::Revelation => 7.0,
        SegmentRole::Context => 7.0,
        SegmentRole::Consequence => 5.0,
        SegmentRole::Cta => 3.0,
        SegmentRole::Disclosure => 2.0,
    }
}

fn pool_for(role: SegmentRole) -> PoolKind {
    match role {
        SegmentRole::Hook => PoolKind::Hooks,
        SegmentRole::Opening => PoolKind::PainAmplifiers,
        SegmentRole::Revelation => PoolKind::AuthorityMarkers,
        SegmentRole::Context => PoolKind::EmotionalTriggers,
        SegmentRole::Consequence => PoolKind::PainAmplifiers,
        SegmentRole::Cta => PoolKind::Ctas,
        SegmentRole::Disclosure => PoolKind::Disclosures,
    }
}

/// Health-adjacent categories that always carry the medical disclaimer.
const HEALTH_CATEGORIES: &[&str] = &["supplement", "chronic_fatigue", "sleep", "gut_health"];

pub struct ScriptComposer {
    registry: Arc<TemplateRegistry>,
    config: ComposerConfig,
}

impl ScriptComposer {
    pub fn new(registry: Arc<TemplateRegistry>, config: ComposerConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<TemplateRegistry> {
        &self.registry
    }

    /// Compose a script. Deterministic for a fixed (strategy, seed,
    /// variation seed) against the same registry snapshot.
    pub fn compose(
        &self,
        strategy: Strategy,
        seed: &Seed,
        intensity: Intensity,
        target_duration_s: f32,
        variation_seed: u64,
    ) -> Result<Script, OrchestratorError> {
        validate_seed(seed)?;
        let bindings = bindings_for(seed);
        let mut rng = StdRng::seed_from_u64(variation_seed);
        let disclosure = disclosure_category(seed);

        // Disclosure is structural only when the seed carries an obligation.
        let roles: Vec<SegmentRole> = strategy
            .structure()
            .iter()
            .copied()
            .filter(|&role| role != SegmentRole::Disclosure || disclosure.is_some())
            .collect();

        // Select and bind one template per role before timing is assigned.
        let mut picked = Vec::with_capacity(roles.len());
        let mut hook_weight = 1.0f32;
        let mut cta_weight = 1.0f32;
        for &role in &roles {
            let category = match (role, disclosure) {
                (SegmentRole::Disclosure, Some(tag)) => tag.to_string(),
                (SegmentRole::Disclosure, None) => continue,
                _ => seed.category.clone(),
            };
            let entry = self
                .registry
                .select(pool_for(role), &category, &mut rng)
                .map_err(lift_registry_error)?;
            let text = instantiate(&entry.text, &bindings).map_err(lift_registry_error)?;
            match role {
                SegmentRole::Hook => hook_weight = entry.weight,
                SegmentRole::Cta => cta_weight = entry.weight,
                _ => {}
            }
            picked.push((role, entry, text));
        }

        let total_weight: f32 = roles.iter().map(|&r| timing_weight(r)).sum();
        let mut cursor = 0.0f32;
        let mut segments = Vec::with_capacity(picked.len());
        for (role, entry, text) in picked {
            let duration = timing_weight(role) / total_weight * target_duration_s;
            segments.push(Segment {
                role,
                text,
                tone: entry
                    .tone
                    .clone()
                    .unwrap_or_else(|| default_tone(intensity).to_string()),
                start_s: cursor,
                duration_s: duration,
                delivery_notes: delivery_notes(role),
            });
            cursor += duration;
        }

        let hashtags = self.build_hashtags(seed);
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let word_count = Script::count_words(&full_text);

        let mut script = Script {
            segments,
            hashtags,
            estimated_duration_s: Script::estimate_duration_s(word_count),
            word_count,
            viral_score: 0,
        };
        script.viral_score = score::predict(
            &self.config,
            &ScoreInputs {
                script: &script,
                category: &seed.category,
                hook_weight,
                cta_weight,
            },
        );
        Ok(script)
    }

    /// Base pool + category tags + mandatory compliance tags, deduplicated
    /// case-insensitively and capped. Compliance tags go first so the cap
    /// can never push them out.
    fn build_hashtags(&self, seed: &Seed) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        if seed.signals.affiliate_link {
            tags.push("#ad".to_string());
        }
        if seed.signals.ai_assisted {
            tags.push("#AIGenerated".to_string());
        }
        let category_tag = format!("#{}", seed.category.replace([' ', '-'], "").replace('_', ""));
        if category_tag.len() > 1 {
            tags.push(category_tag);
        }
        tags.extend(self.registry.hashtag_bases(&seed.category));

        let mut seen = std::collections::HashSet::new();
        tags.retain(|t| seen.insert(t.to_lowercase()));
        tags.truncate(self.config.hashtag_max);
        tags
    }
}

fn validate_seed(seed: &Seed) -> Result<(), OrchestratorError> {
    if seed.category.trim().is_empty() {
        return Err(OrchestratorError::InvalidRequest("seed category missing".into()));
    }
    match seed.kind {
        SeedKind::Product if seed.title.trim().is_empty() => Err(
            OrchestratorError::InvalidRequest("product seed needs a title".into()),
        ),
        SeedKind::Story if seed.text.trim().is_empty() => Err(
            OrchestratorError::InvalidRequest("story seed needs text".into()),
        ),
        _ if seed.title.trim().is_empty() && seed.text.trim().is_empty() => Err(
            OrchestratorError::InvalidRequest("seed needs a title or text".into()),
        ),
        _ => Ok(()),
    }
}

fn lift_registry_error(err: RegistryError) -> OrchestratorError {
    match err {
        RegistryError::EmptyPool { .. } => OrchestratorError::TemplateGap(err.to_string()),
        other => OrchestratorError::Internal(other.to_string()),
    }
}

/// Placeholder bindings derived from a seed. Public so the facade can
/// instantiate standalone hook alternatives with the same substitutions
/// the composer uses.
pub fn seed_bindings(seed: &Seed) -> HashMap<String, String> {
    bindings_for(seed)
}

fn bindings_for(seed: &Seed) -> HashMap<String, String> {
    let humanized_category = seed.category.replace('_', " ");
    let pain_point = seed
        .extras
        .get("pain_point")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| humanized_category.clone());
    let ingredient = seed
        .extras
        .get("ingredients")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| seed.title.clone());
    let product = if seed.title.trim().is_empty() {
        humanized_category.clone()
    } else {
        seed.title.clone()
    };

    HashMap::from([
        ("PRODUCT".to_string(), product),
        ("CATEGORY".to_string(), humanized_category),
        ("PAIN_POINT".to_string(), pain_point),
        ("INGREDIENT".to_string(), ingredient),
    ])
}

fn disclosure_category(seed: &Seed) -> Option<&'static str> {
    if seed.signals.affiliate_link {
        Some("affiliate")
    } else if seed.signals.ai_assisted {
        Some("ai")
    } else {
        HEALTH_CATEGORIES
            .iter()
            .copied()
            .find(|&c| c == seed.category)
    }
}

fn default_tone(intensity: Intensity) -> &'static str {
    match intensity {
        Intensity::Low => "calm",
        Intensity::Medium => "confident",
        Intensity::High => "urgent",
    }
}

fn delivery_notes(role: SegmentRole) -> Option<String> {
    match role {
        SegmentRole::Hook => Some("front-load energy, first second decides the scroll".to_string()),
        SegmentRole::Cta => Some("slow down slightly, point at the link".to_string()),
        _ => None,
    }
}
