//! Loan policy and time source configuration.
//!
//! # Responsibility
//! - Hold the tunable loan constants used by inventory transitions.
//! - Abstract "now" so callers and tests can pin timestamps.
//!
//! # Invariants
//! - All timestamps are Unix epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds in one calendar day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

const DEFAULT_LOAN_PERIOD_DAYS: u32 = 14;
const DEFAULT_EXTENSION_DAYS: u32 = 7;

/// Loan durations applied on checkout and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    /// Days between checkout and the initial due date.
    pub loan_period_days: u32,
    /// Days added to the due date per extension.
    pub extension_days: u32,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            extension_days: DEFAULT_EXTENSION_DAYS,
        }
    }
}

impl LoanPolicy {
    pub fn loan_period_ms(&self) -> i64 {
        i64::from(self.loan_period_days) * DAY_MS
    }

    pub fn extension_ms(&self) -> i64 {
        i64::from(self.extension_days) * DAY_MS
    }

    /// Due date for a checkout performed at `now_ms`.
    pub fn due_date_from(&self, now_ms: i64) -> i64 {
        now_ms.saturating_add(self.loan_period_ms())
    }
}

/// Source of the current time.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
            })
    }
}

/// Time source pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}
