//! Placeholder substitution.

use crate::registry::RegistryError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Z][A-Z0-9_]*)\}").expect("placeholder regex"));

/// Substitute every `{NAME}` placeholder exactly once from `bindings`.
///
/// Pure: same template and bindings always produce the same string. A
/// placeholder with no binding is an error, never silently left in place.
pub fn instantiate(
    template: &str,
    bindings: &HashMap<String, String>,
) -> Result<String, RegistryError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = caps.get(0).expect("capture 0 always present");
        let name = &caps[1];
        let value = bindings
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPlaceholder(name.to_string()))?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_substitutes_all_placeholders() {
        let out = instantiate(
            "Tired of {PAIN_POINT}? Try {PRODUCT}.",
            &bindings(&[("PAIN_POINT", "restless nights"), ("PRODUCT", "SleepWell")]),
        )
        .unwrap();
        assert_eq!(out, "Tired of restless nights? Try SleepWell.");
    }

    #[test]
    fn test_repeated_placeholder_substituted_each_time() {
        let out = instantiate(
            "{PRODUCT}, yes {PRODUCT}",
            &bindings(&[("PRODUCT", "CoQ10")]),
        )
        .unwrap();
        assert_eq!(out, "CoQ10, yes CoQ10");
    }

    #[test]
    fn test_unknown_placeholder_errors() {
        let err = instantiate("Try {MYSTERY}", &bindings(&[])).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownPlaceholder(name) if name == "MYSTERY"));
    }

    #[test]
    fn test_plain_text_passes_through() {
        let out = instantiate("No placeholders here", &bindings(&[])).unwrap();
        assert_eq!(out, "No placeholders here");
    }

    #[test]
    fn test_lowercase_braces_ignored() {
        // Only SCREAMING_CASE names are placeholders; JSON-ish braces pass.
        let out = instantiate("keep {this} as-is", &bindings(&[])).unwrap();
        assert_eq!(out, "keep {this} as-is");
    }
}
