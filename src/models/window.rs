use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DateWindow: Inclusive calendar-date interval
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` interval of calendar dates. `start <= end` always
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window between two dates given in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// One-day window.
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// The `days`-long window ending on `end`. `days` below one is treated as
    /// one.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days.max(1) - 1),
            end,
        }
    }

    /// Number of calendar days covered, bounds included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The window of equal length ending the day before `start`, or `None`
    /// when it would begin before the earliest representable date.
    pub fn previous(&self) -> Option<Self> {
        let end = self.start.checked_sub_signed(Duration::days(1))?;
        let start = end.checked_sub_signed(Duration::try_days(self.days() - 1)?)?;
        Some(Self { start, end })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// `(start, end)` formatted as `YYYY-MM-DD` strings, the form bound into
    /// SQL filters.
    pub fn bounds(&self) -> (String, String) {
        (self.start.to_string(), self.end.to_string())
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
