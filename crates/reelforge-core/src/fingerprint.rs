//! Request fingerprints.
//!
//! The fingerprint is the cache key and the artifact id: a hash of the
//! request fields that change the produced content. Two requests with the
//! same fingerprint always resolve to the same artifact while it is live.

use crate::request::GenerationRequest;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint for one variation of a routed request.
    ///
    /// The strategy comes from routing, not the request, so that "auto" and
    /// an explicit choice of the same strategy address the same artifact.
    pub fn compute(request: &GenerationRequest, strategy: Strategy, variation_seed: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(request.seed.seed_id().as_bytes());
        hasher.update(b"|");
        hasher.update(request.target_duration_s.to_bits().to_le_bytes().as_slice());
        hasher.update(b"|");
        hasher.update(request.voice_id.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(&[request.captions as u8]);
        hasher.update(b"|");
        hasher.update(strategy.tag().as_bytes());
        hasher.update(b"|");
        hasher.update(&variation_seed.to_le_bytes());
        Fingerprint(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shared prefix across variations of the same request: everything but
    /// the variation seed.
    pub fn request_prefix(request: &GenerationRequest, strategy: Strategy) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(request.seed.seed_id().as_bytes());
        hasher.update(b"|");
        hasher.update(request.target_duration_s.to_bits().to_le_bytes().as_slice());
        hasher.update(b"|");
        hasher.update(request.voice_id.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(&[request.captions as u8]);
        hasher.update(b"|");
        hasher.update(strategy.tag().as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Seed, SeedKind};

    fn request() -> GenerationRequest {
        GenerationRequest::new(Seed::new(SeedKind::Product, "sleep", "Melatonin gummies"))
    }

    #[test]
    fn test_same_inputs_same_fingerprint() {
        let a = Fingerprint::compute(&request(), Strategy::UgcVariations, 42);
        let b = Fingerprint::compute(&request(), Strategy::UgcVariations, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_variation_seed_changes_fingerprint() {
        let a = Fingerprint::compute(&request(), Strategy::UgcVariations, 1);
        let b = Fingerprint::compute(&request(), Strategy::UgcVariations, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_strategy_changes_fingerprint() {
        let a = Fingerprint::compute(&request(), Strategy::UgcVariations, 1);
        let b = Fingerprint::compute(&request(), Strategy::Educational, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_variations_share_a_request_prefix() {
        // Variations of one routed request group under a common prefix
        // hash even though their full fingerprints differ.
        let req = request();
        let prefix_a = Fingerprint::request_prefix(&req, Strategy::UgcVariations);
        let prefix_b = Fingerprint::request_prefix(&req, Strategy::UgcVariations);
        assert_eq!(prefix_a, prefix_b);
        assert_ne!(
            prefix_a,
            Fingerprint::request_prefix(&req, Strategy::Educational)
        );
    }
}
