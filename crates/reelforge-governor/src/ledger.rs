//! Admission, commit, and the per-day ledgers.

use crate::config::{GovernorConfig, QuotaLimits};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use reelforge_core::{Clock, ProviderId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Why an admission was refused. Non-retriable until the day rolls over
/// (concurrency rejections clear as soon as in-flight calls finish).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Calls,
    Cost,
    Tokens,
    Concurrency,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Calls => "daily call limit",
            RejectReason::Cost => "daily cost limit",
            RejectReason::Tokens => "daily token limit",
            RejectReason::Concurrency => "concurrent call limit",
        }
    }
}

/// Handle for an admitted call. Must be passed back to `commit` (on
/// completion) or `release` (on abandonment); a leaked reservation is
/// reaped after the grace period.
#[derive(Debug)]
pub struct Reservation {
    pub(crate) id: u64,
    pub provider: ProviderId,
    pub(crate) est_cost_usd: f64,
    pub(crate) est_tokens: u64,
}

/// Result of an admission check.
#[derive(Debug)]
pub enum Admission {
    Admitted(Reservation),
    Rejected { provider: ProviderId, reason: RejectReason },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted(_))
    }
}

/// Read-only availability view the router scores against.
pub trait AdmissionView: Send + Sync {
    /// Whether a typical call to this provider would currently be admitted.
    fn available(&self, provider: ProviderId) -> bool;
}

struct Pending {
    cost_usd: f64,
    tokens: u64,
    reserved_at: DateTime<Utc>,
}

struct DayLedger {
    day: NaiveDate,
    calls_used: u32,
    cost_used_usd: f64,
    tokens_used: u64,
    pending: HashMap<u64, Pending>,
}

impl DayLedger {
    fn fresh(day: NaiveDate) -> Self {
        Self {
            day,
            calls_used: 0,
            cost_used_usd: 0.0,
            tokens_used: 0,
            pending: HashMap::new(),
        }
    }
}

/// Per-provider usage snapshot for `/usage/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderUsage {
    pub calls: u32,
    pub cost_usd: f64,
    pub tokens: u64,
    pub in_flight: u32,
    pub limits: QuotaLimits,
    /// Worst of the three ceiling ratios, 0..1.
    pub utilization: f64,
}

/// Overall budget band derived from cost utilization.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub percent_used: f64,
    /// "ok" below 70%, "warning" below 90%, "critical" at or above.
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GovernorSnapshot {
    pub providers: HashMap<ProviderId, ProviderUsage>,
    pub total_cost_today_usd: f64,
    pub budget: BudgetStatus,
}

/// The governor. All counter updates are serialized per process; admit and
/// commit never suspend.
pub struct QuotaGovernor {
    clock: Arc<dyn Clock>,
    config: GovernorConfig,
    next_id: AtomicU64,
    ledgers: Mutex<HashMap<ProviderId, DayLedger>>,
}

impl QuotaGovernor {
    pub fn new(clock: Arc<dyn Clock>, config: GovernorConfig) -> Self {
        Self {
            clock,
            config,
            next_id: AtomicU64::new(1),
            ledgers: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject a call with the given estimates. On admit, the
    /// estimates are reserved against today's ledger until commit/release.
    pub fn admit(&self, provider: ProviderId, est_cost_usd: f64, est_tokens: u64) -> Admission {
        let limits = self.config.limits_for(provider);
        let now = self.clock.now();
        let today = self.clock.local_date();

        let mut ledgers = self.ledgers.lock().unwrap();
        let ledger = ledgers
            .entry(provider)
            .or_insert_with(|| DayLedger::fresh(today));
        self.rotate_and_reap(ledger, today, now);

        let reason = if ledger.calls_used + 1 > limits.max_calls {
            Some(RejectReason::Calls)
        } else if ledger.cost_used_usd + est_cost_usd > limits.max_cost_usd {
            Some(RejectReason::Cost)
        } else if ledger.tokens_used + est_tokens > limits.max_tokens {
            Some(RejectReason::Tokens)
        } else if ledger.pending.len() as u32 >= limits.max_concurrent {
            Some(RejectReason::Concurrency)
        } else {
            None
        };

        if let Some(reason) = reason {
            tracing::warn!(provider = %provider, reason = reason.as_str(), "admission rejected");
            return Admission::Rejected { provider, reason };
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        ledger.calls_used += 1;
        ledger.cost_used_usd += est_cost_usd;
        ledger.tokens_used += est_tokens;
        ledger.pending.insert(
            id,
            Pending { cost_usd: est_cost_usd, tokens: est_tokens, reserved_at: now },
        );
        tracing::debug!(provider = %provider, id, est_cost_usd, est_tokens, "admitted");
        Admission::Admitted(Reservation { id, provider, est_cost_usd, est_tokens })
    }

    /// Fold actual spend into the ledger and free the reservation.
    ///
    /// If the reservation is gone (day rotated or grace-reaped), the actuals
    /// are still folded in: real spend must be reflected.
    pub fn commit(&self, reservation: Reservation, actual_cost_usd: f64, actual_tokens: u64) {
        let today = self.clock.local_date();
        let now = self.clock.now();
        let mut ledgers = self.ledgers.lock().unwrap();
        let ledger = ledgers
            .entry(reservation.provider)
            .or_insert_with(|| DayLedger::fresh(today));
        self.rotate_and_reap(ledger, today, now);

        match ledger.pending.remove(&reservation.id) {
            Some(_) => {
                ledger.cost_used_usd += actual_cost_usd - reservation.est_cost_usd;
                ledger.tokens_used = ledger
                    .tokens_used
                    .saturating_sub(reservation.est_tokens)
                    .saturating_add(actual_tokens);
                // Float drift can push the fold slightly negative.
                if ledger.cost_used_usd < 0.0 {
                    ledger.cost_used_usd = 0.0;
                }
            }
            None => {
                ledger.calls_used += 1;
                ledger.cost_used_usd += actual_cost_usd;
                ledger.tokens_used = ledger.tokens_used.saturating_add(actual_tokens);
            }
        }
    }

    /// Free a reservation without spend (call never happened).
    pub fn release(&self, reservation: Reservation) {
        let today = self.clock.local_date();
        let now = self.clock.now();
        let mut ledgers = self.ledgers.lock().unwrap();
        let Some(ledger) = ledgers.get_mut(&reservation.provider) else {
            return;
        };
        self.rotate_and_reap(ledger, today, now);
        if ledger.pending.remove(&reservation.id).is_some() {
            ledger.calls_used = ledger.calls_used.saturating_sub(1);
            ledger.cost_used_usd = (ledger.cost_used_usd - reservation.est_cost_usd).max(0.0);
            ledger.tokens_used = ledger.tokens_used.saturating_sub(reservation.est_tokens);
        }
    }

    /// Conservative usage view for reporting.
    pub fn snapshot(&self) -> GovernorSnapshot {
        let today = self.clock.local_date();
        let now = self.clock.now();
        let mut ledgers = self.ledgers.lock().unwrap();

        let mut providers = HashMap::new();
        let mut total_cost = 0.0;
        let mut total_budget = 0.0;
        for &provider in ProviderId::all() {
            let limits = self.config.limits_for(provider);
            total_budget += limits.max_cost_usd;
            let usage = match ledgers.get_mut(&provider) {
                Some(ledger) => {
                    self.rotate_and_reap(ledger, today, now);
                    let call_ratio = ledger.calls_used as f64 / limits.max_calls.max(1) as f64;
                    let cost_ratio = if limits.max_cost_usd > 0.0 {
                        ledger.cost_used_usd / limits.max_cost_usd
                    } else {
                        0.0
                    };
                    let token_ratio = ledger.tokens_used as f64 / limits.max_tokens.max(1) as f64;
                    total_cost += ledger.cost_used_usd;
                    ProviderUsage {
                        calls: ledger.calls_used,
                        cost_usd: ledger.cost_used_usd,
                        tokens: ledger.tokens_used,
                        in_flight: ledger.pending.len() as u32,
                        limits,
                        utilization: call_ratio.max(cost_ratio).max(token_ratio),
                    }
                }
                None => ProviderUsage {
                    calls: 0,
                    cost_usd: 0.0,
                    tokens: 0,
                    in_flight: 0,
                    limits,
                    utilization: 0.0,
                },
            };
            providers.insert(provider, usage);
        }

        let percent_used = if total_budget > 0.0 {
            total_cost / total_budget * 100.0
        } else {
            0.0
        };
        let status = if percent_used < 70.0 {
            "ok"
        } else if percent_used < 90.0 {
            "warning"
        } else {
            "critical"
        };

        GovernorSnapshot {
            providers,
            total_cost_today_usd: total_cost,
            budget: BudgetStatus { percent_used, status },
        }
    }

    fn rotate_and_reap(&self, ledger: &mut DayLedger, today: NaiveDate, now: DateTime<Utc>) {
        if ledger.day != today {
            *ledger = DayLedger::fresh(today);
            return;
        }
        let grace = Duration::seconds(self.config.reservation_grace_s);
        let expired: Vec<u64> = ledger
            .pending
            .iter()
            .filter(|(_, p)| now - p.reserved_at > grace)
            .map(|(&id, _)| id)
            .collect();
        for id in expired {
            if let Some(p) = ledger.pending.remove(&id) {
                tracing::warn!(id, "reaping abandoned reservation");
                ledger.calls_used = ledger.calls_used.saturating_sub(1);
                ledger.cost_used_usd = (ledger.cost_used_usd - p.cost_usd).max(0.0);
                ledger.tokens_used = ledger.tokens_used.saturating_sub(p.tokens);
            }
        }
    }
}

impl AdmissionView for QuotaGovernor {
    fn available(&self, provider: ProviderId) -> bool {
        let limits = self.config.limits_for(provider);
        let today = self.clock.local_date();
        let ledgers = self.ledgers.lock().unwrap();
        match ledgers.get(&provider) {
            Some(ledger) if ledger.day == today => {
                ledger.calls_used < limits.max_calls
                    && ledger.cost_used_usd < limits.max_cost_usd
                    && ledger.tokens_used < limits.max_tokens
                    && (ledger.pending.len() as u32) < limits.max_concurrent
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reelforge_core::ManualClock;

    fn governor_with(limits: QuotaLimits) -> (Arc<ManualClock>, QuotaGovernor) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        ));
        let config = GovernorConfig::default().with_limit(ProviderId::Claude, limits);
        let governor = QuotaGovernor::new(clock.clone(), config);
        (clock, governor)
    }

    #[test]
    fn test_admit_until_call_limit() {
        let (_, governor) = governor_with(QuotaLimits::new(2, 100.0, 1_000_000, 10));
        let a = governor.admit(ProviderId::Claude, 0.1, 100);
        let b = governor.admit(ProviderId::Claude, 0.1, 100);
        assert!(a.is_admitted());
        assert!(b.is_admitted());
        match governor.admit(ProviderId::Claude, 0.1, 100) {
            Admission::Rejected { reason, .. } => assert_eq!(reason, RejectReason::Calls),
            Admission::Admitted(_) => panic!("third call should be rejected"),
        }
    }

    #[test]
    fn test_cost_ceiling_counts_reservations() {
        let (_, governor) = governor_with(QuotaLimits::new(100, 1.0, 1_000_000, 10));
        let res = match governor.admit(ProviderId::Claude, 0.8, 0) {
            Admission::Admitted(res) => res,
            Admission::Rejected { .. } => panic!("first admit should pass"),
        };
        // Reservation already holds 0.8 of the 1.0 budget.
        assert!(!governor.admit(ProviderId::Claude, 0.5, 0).is_admitted());

        // Actual spend was lower; the freed headroom readmits.
        governor.commit(res, 0.2, 0);
        assert!(governor.admit(ProviderId::Claude, 0.5, 0).is_admitted());
    }

    #[test]
    fn test_concurrency_exclusion_and_release() {
        let (_, governor) = governor_with(QuotaLimits::new(100, 100.0, 1_000_000, 1));
        let res = match governor.admit(ProviderId::Claude, 0.1, 0) {
            Admission::Admitted(res) => res,
            _ => panic!(),
        };
        match governor.admit(ProviderId::Claude, 0.1, 0) {
            Admission::Rejected { reason, .. } => assert_eq!(reason, RejectReason::Concurrency),
            _ => panic!("second concurrent call should be rejected"),
        }
        governor.release(res);
        assert!(governor.admit(ProviderId::Claude, 0.1, 0).is_admitted());
    }

    #[test]
    fn test_day_rollover_resets_counters() {
        let (clock, governor) = governor_with(QuotaLimits::new(1, 100.0, 1_000_000, 10));
        let res = match governor.admit(ProviderId::Claude, 0.1, 10) {
            Admission::Admitted(res) => res,
            _ => panic!(),
        };
        governor.commit(res, 0.1, 10);
        assert!(!governor.admit(ProviderId::Claude, 0.1, 10).is_admitted());

        clock.advance(chrono::Duration::days(1));
        assert!(governor.admit(ProviderId::Claude, 0.1, 10).is_admitted());
        let snap = governor.snapshot();
        assert_eq!(snap.providers[&ProviderId::Claude].calls, 1);
    }

    #[test]
    fn test_abandoned_reservation_reaped_after_grace() {
        let (clock, governor) = governor_with(QuotaLimits::new(100, 100.0, 1_000_000, 1));
        let _leaked = governor.admit(ProviderId::Claude, 0.1, 0);
        assert!(!governor.admit(ProviderId::Claude, 0.1, 0).is_admitted());

        clock.advance(chrono::Duration::seconds(121));
        assert!(governor.admit(ProviderId::Claude, 0.1, 0).is_admitted());
    }

    #[test]
    fn test_release_without_commit_restores_counters() {
        let (_, governor) = governor_with(QuotaLimits::new(100, 100.0, 1_000_000, 10));
        let res = match governor.admit(ProviderId::Claude, 2.0, 500) {
            Admission::Admitted(res) => res,
            _ => panic!(),
        };
        governor.release(res);
        let snap = governor.snapshot();
        let usage = &snap.providers[&ProviderId::Claude];
        assert_eq!(usage.calls, 0);
        assert_eq!(usage.tokens, 0);
        assert_eq!(usage.cost_usd, 0.0);
    }

    #[test]
    fn test_ceilings_never_exceeded_concurrently() {
        // Counters stay within limits at every observable moment even
        // under concurrent admission pressure.
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        ));
        let config = GovernorConfig::default()
            .with_limit(ProviderId::Claude, QuotaLimits::new(10, 1.0, 10_000, 10));
        let governor = Arc::new(QuotaGovernor::new(clock, config));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let governor = governor.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..20 {
                    if let Admission::Admitted(res) = governor.admit(ProviderId::Claude, 0.05, 400)
                    {
                        let snap = governor.snapshot();
                        let usage = &snap.providers[&ProviderId::Claude];
                        assert!(usage.calls <= 10);
                        assert!(usage.cost_usd <= 1.0 + 1e-9);
                        assert!(usage.tokens <= 10_000);
                        governor.commit(res, 0.05, 400);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_snapshot_budget_bands() {
        let (_, governor) = governor_with(QuotaLimits::new(100, 100.0, 1_000_000, 10));
        let snap = governor.snapshot();
        assert_eq!(snap.budget.status, "ok");
        assert_eq!(snap.total_cost_today_usd, 0.0);
    }
}
