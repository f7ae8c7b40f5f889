//! Shadowban Risk Engine.
//!
//! Pure statistical assessment of an account's recent metrics against its
//! own rolling baseline: recent = last 7 days, baseline = the 7 days before
//! that. Emits a graded report with a fixed recovery plan, and idempotent
//! alerts per (account, utc-day, grade).

pub mod engine;
pub mod sample;

pub use engine::{
    Alert, RecoveryPlan, RiskAssessment, RiskConfig, RiskLevel, RiskReport, ShadowbanRiskEngine,
    WindowSummary,
};
pub use sample::AccountMetricsSample;
