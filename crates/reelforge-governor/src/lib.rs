//! Quota & Budget Governor.
//!
//! Every provider call is admitted through exactly one quota check before it
//! is made. The governor keeps one ledger per (provider, local-day), rotated
//! lazily at day rollover, and counts reservations conservatively: readers
//! may see slight over-counting while calls are in flight, never
//! under-counting.

pub mod config;
pub mod ledger;

pub use config::{GovernorConfig, QuotaLimits};
pub use ledger::{
    Admission, AdmissionView, BudgetStatus, GovernorSnapshot, ProviderUsage, QuotaGovernor,
    RejectReason, Reservation,
};
