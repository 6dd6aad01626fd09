//! Test clock — deterministic `Clock` implementation for tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fittrack_core::clock::Clock;

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// A clock fixed at 10:00 UTC on the given calendar day.
    ///
    /// # Panics
    ///
    /// Panics if the date is invalid.
    #[must_use]
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self(Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap())
    }

    /// Returns a clock advanced by `days` calendar days.
    #[must_use]
    pub fn plus_days(self, days: i64) -> Self {
        Self(self.0 + chrono::Duration::days(days))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Shorthand for a calendar date in tests.
///
/// # Panics
///
/// Panics if the date is invalid.
#[must_use]
pub fn utc_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
