//! Strategy Router.
//!
//! Scores every (strategy, provider) candidate for a request and picks the
//! winner plus a variation count. Scoring folds in content alignment, trust
//! fit, current quota availability, caller preference, and a monthly mix
//! rebalancing nudge so one provider does not absorb the whole budget.

pub mod classify;
pub mod config;
pub mod router;

pub use classify::is_supplement_seed;
pub use config::RouterConfig;
pub use router::{RoutingDecision, StrategyRouter};
