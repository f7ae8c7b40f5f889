//! Corpus file loading.
//!
//! Deployments override the built-in corpus with a YAML file:
//!
//! ```yaml
//! version: "1.0"
//! pools:
//!   hooks:
//!     - text: "Stop scrolling. {PRODUCT} changed my mornings."
//!       weight: 2.0
//!       categories: [supplement]
//!   ctas:
//!     - text: "Link in bio."
//! ```

use crate::registry::{PoolKind, RegistryError, TemplateEntry, TemplateRegistry};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusFile {
    pub version: String,
    pub pools: HashMap<String, Vec<TemplateEntry>>,
}

impl CorpusFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, RegistryError> {
        serde_yaml::from_str(yaml).map_err(|e| RegistryError::Parse(e.to_string()))
    }

    pub fn load(path: &str) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Parse(format!("read {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// Build a registry, rejecting unknown pool keys.
    pub fn into_registry(self) -> Result<TemplateRegistry, RegistryError> {
        let mut pools = HashMap::new();
        for (key, entries) in self.pools {
            let kind = PoolKind::from_key(&key)
                .ok_or_else(|| RegistryError::Parse(format!("unknown pool '{}'", key)))?;
            pools.insert(kind, entries);
        }
        Ok(TemplateRegistry::new(pools))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_build() {
        let yaml = r#"
version: "1.0"
pools:
  hooks:
    - text: "Watch this about {PRODUCT}"
      weight: 2.0
      categories: [supplement]
    - text: "Generic hook"
  ctas:
    - text: "Link in bio."
"#;
        let registry = CorpusFile::from_yaml(yaml).unwrap().into_registry().unwrap();
        assert_eq!(registry.pool(PoolKind::Hooks).len(), 2);
        assert_eq!(registry.pool(PoolKind::Ctas).len(), 1);
        assert_eq!(registry.pool(PoolKind::Hooks)[0].weight, 2.0);
    }

    #[test]
    fn test_unknown_pool_rejected() {
        let yaml = r#"
version: "1.0"
pools:
  jingles:
    - text: "la la la"
"#;
        let err = CorpusFile::from_yaml(yaml).unwrap().into_registry().unwrap_err();
        assert!(matches!(err, RegistryError::Parse(msg) if msg.contains("jingles")));
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = r#"
version: "1.0"
pools:
  hooks:
    - text: "bare entry"
"#;
        let file = CorpusFile::from_yaml(yaml).unwrap();
        let entry = &file.pools["hooks"][0];
        assert_eq!(entry.weight, 1.0);
        assert!(entry.categories.is_empty());
        assert!(entry.tone.is_none());
    }
}
