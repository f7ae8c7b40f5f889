//! Compliance verdicts.

use serde::{Deserialize, Serialize};

/// Outcome of a content audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NeedsRemediation,
    Blocked,
}

/// Coarse risk grade attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskGrade {
    Low,
    Medium,
    High,
}

/// One audit finding, with a suggested replacement where one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    /// Rule identifier, e.g. "avoid_language", "missing_disclosure".
    pub rule: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ComplianceIssue {
    pub fn new(rule: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            detail: detail.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Result of auditing a script plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub status: ComplianceStatus,
    pub issues: Vec<ComplianceIssue>,
    /// Concrete additions that would make the content compliant,
    /// e.g. "#ad", "AI disclosure".
    pub required_additions: Vec<String>,
    pub risk_grade: RiskGrade,
    /// Starts at 100; each violation deducts. Advisory alongside status.
    pub safety_score: u32,
}

impl ComplianceVerdict {
    pub fn compliant() -> Self {
        Self {
            status: ComplianceStatus::Compliant,
            issues: Vec::new(),
            required_additions: Vec::new(),
            risk_grade: RiskGrade::Low,
            safety_score: 100,
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.status == ComplianceStatus::Compliant
    }

    pub fn is_blocked(&self) -> bool {
        self.status == ComplianceStatus::Blocked
    }

    /// One-line description used in error messages and logs.
    pub fn summary(&self) -> String {
        match self.status {
            ComplianceStatus::Compliant => "compliant".to_string(),
            _ => {
                let rules: Vec<&str> = self.issues.iter().map(|i| i.rule.as_str()).collect();
                format!("{:?} ({})", self.status, rules.join(", "))
            }
        }
    }

    /// Remediation strings for caller-facing payloads: suggestions first,
    /// then required additions.
    pub fn recommendations(&self) -> Vec<String> {
        let mut recs: Vec<String> = self
            .issues
            .iter()
            .filter_map(|i| i.suggestion.clone())
            .collect();
        for add in &self.required_additions {
            let rec = format!("add {}", add);
            if !recs.contains(&rec) {
                recs.push(rec);
            }
        }
        recs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliant_verdict() {
        let verdict = ComplianceVerdict::compliant();
        assert!(verdict.is_compliant());
        assert!(!verdict.is_blocked());
        assert_eq!(verdict.safety_score, 100);
        assert!(verdict.recommendations().is_empty());
    }

    #[test]
    fn test_recommendations_merge_suggestions_and_additions() {
        let verdict = ComplianceVerdict {
            status: ComplianceStatus::NeedsRemediation,
            issues: vec![ComplianceIssue::new("avoid_language", "found 'cures'")
                .with_suggestion("replace 'cures' with 'may support'")],
            required_additions: vec!["#ad".into()],
            risk_grade: RiskGrade::Medium,
            safety_score: 70,
        };
        let recs = verdict.recommendations();
        assert_eq!(recs.len(), 2);
        assert!(recs[0].contains("may support"));
        assert!(recs[1].contains("#ad"));
    }
}
