//! Risk computation, grading, and alerts.

use crate::sample::AccountMetricsSample;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Shadowban risk grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Severe,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => RiskLevel::Severe,
            s if s >= 60 => RiskLevel::High,
            s if s >= 30 => RiskLevel::Medium,
            s if s >= 15 => RiskLevel::Low,
            _ => RiskLevel::Minimal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "minimal",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Severe => "severe",
        }
    }

    /// Grades at or above this emit alerts.
    pub fn alerts(&self) -> bool {
        *self >= RiskLevel::Medium
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed posting policy per grade.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryPlan {
    pub action: &'static str,
    pub pause_hours: u32,
    /// Multiplier on the normal posting cadence once posting resumes.
    pub cadence_multiplier: f32,
    pub diversification: &'static str,
}

impl RecoveryPlan {
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Minimal => Self {
                action: "maintain",
                pause_hours: 0,
                cadence_multiplier: 1.0,
                diversification: "keep the current content mix",
            },
            RiskLevel::Low => Self {
                action: "monitor",
                pause_hours: 0,
                cadence_multiplier: 1.0,
                diversification: "rotate hashtag sets for the next week",
            },
            RiskLevel::Medium => Self {
                action: "reduce_frequency",
                pause_hours: 24,
                cadence_multiplier: 0.5,
                diversification: "mix in non-promotional formats",
            },
            RiskLevel::High => Self {
                action: "immediate_pause",
                pause_hours: 48,
                cadence_multiplier: 0.25,
                diversification: "pause promotions, post organic content only",
            },
            RiskLevel::Severe => Self {
                action: "full_stop",
                pause_hours: 72,
                cadence_multiplier: 0.0,
                diversification: "halt posting and review account standing",
            },
        }
    }
}

/// Averages backing a report, for display and debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSummary {
    pub recent_samples: usize,
    pub baseline_samples: usize,
    pub recent_avg_views: f64,
    pub baseline_avg_views: f64,
    pub recent_engagement_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub account_id: String,
    pub level: RiskLevel,
    pub score: u32,
    /// Formatted factor strings, e.g. "severe_view_drop: 80.0%".
    pub factors: Vec<String>,
    pub recovery: RecoveryPlan,
    pub metrics: WindowSummary,
    pub assessed_at: DateTime<Utc>,
    /// True when this assessment emitted a new alert.
    pub alert_emitted: bool,
}

/// Assessment outcome; thin windows return `InsufficientData` rather than
/// a guessed grade.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RiskAssessment {
    InsufficientData { recent_samples: usize, baseline_samples: usize },
    Assessed(RiskReport),
}

impl RiskAssessment {
    pub fn report(&self) -> Option<&RiskReport> {
        match self {
            RiskAssessment::Assessed(report) => Some(report),
            RiskAssessment::InsufficientData { .. } => None,
        }
    }
}

/// An emitted alert; idempotent per (account, utc-day, grade).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub account_id: String,
    pub level: RiskLevel,
    pub factors: Vec<String>,
    pub metrics: WindowSummary,
    pub emitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Window length; recent = last half, baseline = the half before.
    pub window_days: i64,
    /// Denominator for the hashtag performance ratio.
    pub hashtag_baseline_views: f64,
    pub min_samples: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self { window_days: 14, hashtag_baseline_views: 10_000.0, min_samples: 2 }
    }
}

/// The engine. Sample streams and emitted alerts are the only state.
pub struct ShadowbanRiskEngine {
    config: RiskConfig,
    samples: Mutex<HashMap<String, Vec<AccountMetricsSample>>>,
    alerts: Mutex<HashMap<(String, NaiveDate, RiskLevel), Alert>>,
}

impl ShadowbanRiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self {
            config,
            samples: Mutex::new(HashMap::new()),
            alerts: Mutex::new(HashMap::new()),
        }
    }

    /// Append a sample to the account's stream.
    pub fn record(&self, sample: AccountMetricsSample) {
        let mut streams = self.samples.lock().unwrap();
        let stream = streams.entry(sample.account_id.clone()).or_default();
        stream.push(sample);
        stream.sort_by_key(|s| s.captured_at);
    }

    /// Assess the account as of `now`. Pure over the recorded stream apart
    /// from alert bookkeeping.
    pub fn assess(&self, account_id: &str, now: DateTime<Utc>) -> RiskAssessment {
        let streams = self.samples.lock().unwrap();
        let stream = streams.get(account_id).map(|v| v.as_slice()).unwrap_or(&[]);

        let half = Duration::days(self.config.window_days / 2);
        let recent_start = now - half;
        let baseline_start = now - Duration::days(self.config.window_days);

        let recent: Vec<&AccountMetricsSample> = stream
            .iter()
            .filter(|s| s.captured_at > recent_start && s.captured_at <= now)
            .collect();
        let baseline: Vec<&AccountMetricsSample> = stream
            .iter()
            .filter(|s| s.captured_at > baseline_start && s.captured_at <= recent_start)
            .collect();

        if recent.len() < self.config.min_samples || baseline.len() < self.config.min_samples {
            return RiskAssessment::InsufficientData {
                recent_samples: recent.len(),
                baseline_samples: baseline.len(),
            };
        }

        let recent_views = avg(&recent, |s| s.views);
        let baseline_views = avg(&baseline, |s| s.views);
        let recent_reach = avg(&recent, |s| s.reach);
        let baseline_reach = avg(&baseline, |s| s.reach);
        let recent_engagement = avg(&recent, |s| s.engagement_rate);

        let mut score = 0u32;
        let mut factors = Vec::new();

        // View drop tiers stack: a severe drop also clears the significant
        // tier, so an 80% collapse contributes 60 on its own.
        if baseline_views > 0.0 {
            let drop = (baseline_views - recent_views) / baseline_views * 100.0;
            if drop >= 70.0 {
                score += 40;
                factors.push(format!("severe_view_drop: {:.1}%", drop));
            }
            if drop >= 40.0 {
                score += 20;
                factors.push(format!("significant_view_drop: {:.1}%", drop));
            }
        }

        if baseline_reach > 0.0 {
            let decline = (baseline_reach - recent_reach) / baseline_reach * 100.0;
            if decline >= 60.0 {
                score += 35;
                factors.push(format!("reach_decline: {:.1}%", decline));
            }
        }

        if recent_engagement < 0.015 {
            score += 25;
            factors.push(format!("low_engagement_rate: {:.4}", recent_engagement));
        }

        let fyp_fractions: Vec<f64> =
            recent.iter().filter_map(|s| s.fyp_fraction()).collect();
        if !fyp_fractions.is_empty() {
            let fyp = fyp_fractions.iter().sum::<f64>() / fyp_fractions.len() as f64;
            if fyp < 0.05 {
                score += 30;
                factors.push(format!("low_fyp_fraction: {:.3}", fyp));
            }
        }

        let hashtag_ratio = recent_views / self.config.hashtag_baseline_views;
        if hashtag_ratio < 0.2 {
            score += 15;
            factors.push(format!("weak_hashtag_performance: {:.2}", hashtag_ratio));
        }

        let level = RiskLevel::from_score(score);
        let metrics = WindowSummary {
            recent_samples: recent.len(),
            baseline_samples: baseline.len(),
            recent_avg_views: recent_views,
            baseline_avg_views: baseline_views,
            recent_engagement_rate: recent_engagement,
        };
        drop(streams);

        let alert_emitted = if level.alerts() {
            self.emit_alert(account_id, now, level, &factors, &metrics)
        } else {
            false
        };

        RiskAssessment::Assessed(RiskReport {
            account_id: account_id.to_string(),
            level,
            score,
            factors,
            recovery: RecoveryPlan::for_level(level),
            metrics,
            assessed_at: now,
            alert_emitted,
        })
    }

    /// Whether the coordinator should refuse new jobs for this account.
    pub fn vetoes(&self, account_id: &str, now: DateTime<Utc>) -> bool {
        matches!(
            self.assess(account_id, now).report(),
            Some(report) if report.level == RiskLevel::Severe
        )
    }

    /// All alerts emitted so far, oldest first.
    pub fn alerts(&self) -> Vec<Alert> {
        let mut out: Vec<Alert> = self.alerts.lock().unwrap().values().cloned().collect();
        out.sort_by_key(|a| a.emitted_at);
        out
    }

    fn emit_alert(
        &self,
        account_id: &str,
        now: DateTime<Utc>,
        level: RiskLevel,
        factors: &[String],
        metrics: &WindowSummary,
    ) -> bool {
        let key = (account_id.to_string(), now.date_naive(), level);
        let mut alerts = self.alerts.lock().unwrap();
        if alerts.contains_key(&key) {
            return false;
        }
        tracing::warn!(account_id, level = %level, "shadowban risk alert");
        alerts.insert(
            key,
            Alert {
                account_id: account_id.to_string(),
                level,
                factors: factors.to_vec(),
                metrics: metrics.clone(),
                emitted_at: now,
            },
        );
        true
    }
}

impl Default for ShadowbanRiskEngine {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}

fn avg(samples: &[&AccountMetricsSample], f: impl Fn(&AccountMetricsSample) -> f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| f(s)).sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    /// Two baseline samples (10-12 days ago) and two recent (1-3 days ago).
    fn seed_account(
        engine: &ShadowbanRiskEngine,
        account: &str,
        baseline_views: f64,
        recent_views: f64,
        baseline_engagement: f64,
        recent_engagement: f64,
    ) {
        for days in [12, 10] {
            engine.record(
                AccountMetricsSample::new(account, now() - Duration::days(days))
                    .with_views(baseline_views)
                    .with_engagement(baseline_engagement),
            );
        }
        for days in [3, 1] {
            engine.record(
                AccountMetricsSample::new(account, now() - Duration::days(days))
                    .with_views(recent_views)
                    .with_engagement(recent_engagement),
            );
        }
    }

    #[test]
    fn test_insufficient_data() {
        let engine = ShadowbanRiskEngine::default();
        engine.record(AccountMetricsSample::new("a", now()).with_views(100.0));
        match engine.assess("a", now()) {
            RiskAssessment::InsufficientData { recent_samples, baseline_samples } => {
                assert_eq!(recent_samples, 1);
                assert_eq!(baseline_samples, 0);
            }
            RiskAssessment::Assessed(_) => panic!("one sample must not grade"),
        }
    }

    #[test]
    fn test_healthy_account_minimal_risk() {
        let engine = ShadowbanRiskEngine::default();
        seed_account(&engine, "a", 10_000.0, 9_500.0, 0.05, 0.05);
        let report = engine.assess("a", now()).report().cloned().unwrap();
        assert_eq!(report.level, RiskLevel::Minimal);
        assert!(report.factors.is_empty());
        assert!(!report.alert_emitted);
    }

    #[test]
    fn test_severe_view_drop_grades_high() {
        // 10k baseline to 2k recent is an 80% drop. Both view-drop
        // tiers fire (40 + 20), landing in the high band.
        let engine = ShadowbanRiskEngine::default();
        seed_account(&engine, "a", 10_000.0, 2_000.0, 0.05, 0.04);
        let report = engine.assess("a", now()).report().cloned().unwrap();
        assert_eq!(report.level, RiskLevel::High);
        assert_eq!(report.score, 60);
        assert!(report.factors.contains(&"severe_view_drop: 80.0%".to_string()));
        assert_eq!(report.recovery.action, "immediate_pause");
        assert!(report.alert_emitted);
    }

    #[test]
    fn test_alert_idempotent_per_day_and_grade() {
        // The second assessment on the same utc-day and grade must not
        // duplicate the alert.
        let engine = ShadowbanRiskEngine::default();
        seed_account(&engine, "a", 10_000.0, 2_000.0, 0.05, 0.04);
        let first = engine.assess("a", now()).report().cloned().unwrap();
        let second = engine.assess("a", now()).report().cloned().unwrap();
        assert!(first.alert_emitted);
        assert!(!second.alert_emitted);
        assert_eq!(engine.alerts().len(), 1);

        // Next day re-alerts.
        let tomorrow = now() + Duration::days(1);
        let third = engine.assess("a", tomorrow).report().cloned().unwrap();
        assert!(third.alert_emitted);
        assert_eq!(engine.alerts().len(), 2);
    }

    #[test]
    fn test_low_engagement_contributes() {
        let engine = ShadowbanRiskEngine::default();
        seed_account(&engine, "a", 10_000.0, 9_000.0, 0.05, 0.01);
        let report = engine.assess("a", now()).report().cloned().unwrap();
        assert!(report.factors.iter().any(|f| f.starts_with("low_engagement_rate")));
        assert_eq!(report.score, 25);
        assert_eq!(report.level, RiskLevel::Low);
    }

    #[test]
    fn test_reach_decline_contributes() {
        let engine = ShadowbanRiskEngine::default();
        for days in [12, 10] {
            engine.record(
                AccountMetricsSample::new("a", now() - Duration::days(days))
                    .with_views(10_000.0)
                    .with_reach(8_000.0)
                    .with_engagement(0.05),
            );
        }
        for days in [3, 1] {
            engine.record(
                AccountMetricsSample::new("a", now() - Duration::days(days))
                    .with_views(9_000.0)
                    .with_reach(2_000.0)
                    .with_engagement(0.05),
            );
        }
        let report = engine.assess("a", now()).report().cloned().unwrap();
        assert!(report.factors.iter().any(|f| f.starts_with("reach_decline")));
        assert_eq!(report.score, 35);
    }

    #[test]
    fn test_collapsed_account_is_severe_and_vetoed() {
        let engine = ShadowbanRiskEngine::default();
        // Views collapse, engagement floor, tiny account so the hashtag
        // ratio also fires: 40+20+25+15 = 100.
        seed_account(&engine, "a", 5_000.0, 500.0, 0.05, 0.005);
        let report = engine.assess("a", now()).report().cloned().unwrap();
        assert_eq!(report.level, RiskLevel::Severe);
        assert_eq!(report.recovery.cadence_multiplier, 0.0);
        assert!(engine.vetoes("a", now()));
    }

    #[test]
    fn test_healthy_account_not_vetoed() {
        let engine = ShadowbanRiskEngine::default();
        seed_account(&engine, "a", 10_000.0, 9_500.0, 0.05, 0.05);
        assert!(!engine.vetoes("a", now()));
    }
}
