//! Injectable wall clock.
//!
//! Quota ledgers roll on the civil date and the risk engine windows on it,
//! so time is a capability handle rather than an ambient global. Tests drive
//! a [`ManualClock`].

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Civil date in the process-local timezone. Quota ledgers key on this.
    fn local_date(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }

    /// Civil date in UTC. Alert idempotency keys on this so replicas agree.
    fn utc_date(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock advanced by hand.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap() = instant;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
