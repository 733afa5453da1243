//! Business day windows and the daily debit limit.
//!
//! "Today" is always evaluated in the configured business timezone. A window
//! is the half-open UTC range `[local midnight, next local midnight)`, which is
//! 23 or 25 hours long across daylight saving transitions.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use super::error::LedgerError;

/// Half-open UTC interval covering one business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// First instant of the day.
    pub start: DateTime<Utc>,
    /// First instant of the next day.
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Returns true if `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    /// Joins two windows into the span from the first start to the last end.
    #[must_use]
    pub fn through(self, last: Self) -> Self {
        Self {
            start: self.start,
            end: last.end,
        }
    }
}

/// Calendar of the business timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessDay {
    tz: Tz,
}

impl Default for BusinessDay {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl BusinessDay {
    /// Creates a calendar for the given timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The business timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Business date of an instant.
    #[must_use]
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    /// Window of the business day containing `at`.
    #[must_use]
    pub fn window_containing(&self, at: DateTime<Utc>) -> DayWindow {
        self.window_for(self.date_of(at))
    }

    /// Window of a business date.
    #[must_use]
    pub fn window_for(&self, date: NaiveDate) -> DayWindow {
        let start = self.start_of(date);
        let end = date
            .succ_opt()
            .map_or(start + TimeDelta::days(1), |next| self.start_of(next));
        DayWindow { start, end }
    }

    /// First UTC instant of a local date.
    fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        if let Some(local) = self.tz.from_local_datetime(&midnight).earliest() {
            return local.with_timezone(&Utc);
        }
        // Midnight skipped by a DST jump: the day starts at the first valid
        // local instant, which is at most a few hours later.
        (1..=3)
            .filter_map(|hours| {
                self.tz
                    .from_local_datetime(&(midnight + TimeDelta::hours(hours)))
                    .earliest()
            })
            .map(|local| local.with_timezone(&Utc))
            .next()
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }
}

/// Cap on cumulative debits per account per business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyLimit {
    limit: Decimal,
}

impl DailyLimit {
    /// Creates a limit.
    #[must_use]
    pub const fn new(limit: Decimal) -> Self {
        Self { limit }
    }

    /// The configured cap.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.limit
    }

    /// Amount that can still be debited today. Never negative.
    #[must_use]
    pub fn remaining(&self, debited_today: Decimal) -> Decimal {
        (self.limit - debited_today).max(Decimal::ZERO)
    }

    /// Fails if debiting `amount` on top of `debited_today` exceeds the cap.
    ///
    /// Reaching the cap exactly is allowed. A sum that overflows `Decimal`
    /// counts as exceeding it.
    pub fn check(&self, debited_today: Decimal, amount: Decimal) -> Result<(), LedgerError> {
        if debited_today
            .checked_add(amount)
            .is_none_or(|total| total > self.limit)
        {
            return Err(LedgerError::DailyLimitExceeded {
                debited_today,
                requested: amount,
                limit: self.limit,
            });
        }
        Ok(())
    }
}
