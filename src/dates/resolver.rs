//! Date range resolution for free-text queries.
//!
//! Rules are tried in a fixed order and the first one that produces a window
//! wins:
//!
//! 1. `between A and B`
//! 2. `on D`, or a bare numeric date token
//! 3. `yesterday` / `today` / `tomorrow`
//! 4. `last N days`
//! 5. `this week` / `last week` (Monday to Sunday)
//! 6. `this month` / `last month`
//! 7. `<month> <yyyy>`
//!
//! A rule whose date tokens do not parse is skipped rather than reported.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::debug;

use super::lexicon::{
    month_number, BETWEEN_PATTERN, DATE_TOKEN_PATTERN, LAST_N_DAYS_PATTERN, MONTH_YEAR_PATTERN,
    ON_DATE_PATTERN,
};
use super::phrase::parse_date_phrase;
use crate::models::DateWindow;

/// Resolve the temporal phrase in `text` against `reference`.
///
/// Returns `None` when no rule matches; callers pick their own default.
pub fn resolve(text: &str, reference: DateTime<Utc>) -> Option<DateWindow> {
    let txt = text.to_lowercase();
    let txt = txt.trim();
    let today = reference.date_naive();

    let window = explicit_range(txt, today)
        .or_else(|| explicit_date(txt, today))
        .or_else(|| relative_day(txt, today))
        .or_else(|| last_n_days(txt, today))
        .or_else(|| calendar_week(txt, today))
        .or_else(|| calendar_month(txt, today))
        .or_else(|| month_year(txt));

    debug!(query = %txt, window = ?window, "resolved date range");
    window
}

/// [`resolve`] against the current instant.
pub fn resolve_now(text: &str) -> Option<DateWindow> {
    resolve(text, Utc::now())
}

fn explicit_range(txt: &str, today: NaiveDate) -> Option<DateWindow> {
    let caps = BETWEEN_PATTERN.captures(txt)?;
    let a = parse_date_phrase(&caps[1], today)?;
    let b = leading_date(&caps[2], today)?;
    Some(DateWindow::new(a, b))
}

/// Longest run of leading words that parses as a date, so trailing words
/// ("... and 2025-01-05 by city") do not hide the bound.
fn leading_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let words: Vec<&str> = text.split_whitespace().collect();
    (1..=words.len())
        .rev()
        .find_map(|n| parse_date_phrase(&words[..n].join(" "), today))
}

fn explicit_date(txt: &str, today: NaiveDate) -> Option<DateWindow> {
    let on = ON_DATE_PATTERN
        .captures(txt)
        .and_then(|caps| parse_date_phrase(&caps[1], today));
    on.or_else(|| {
        DATE_TOKEN_PATTERN
            .find(txt)
            .and_then(|m| parse_date_phrase(m.as_str(), today))
    })
    .map(DateWindow::single)
}

fn relative_day(txt: &str, today: NaiveDate) -> Option<DateWindow> {
    let day = if txt.contains("yesterday") {
        today - Duration::days(1)
    } else if txt.contains("today") {
        today
    } else if txt.contains("tomorrow") {
        today + Duration::days(1)
    } else {
        return None;
    };
    Some(DateWindow::single(day))
}

fn last_n_days(txt: &str, today: NaiveDate) -> Option<DateWindow> {
    let caps = LAST_N_DAYS_PATTERN.captures(txt)?;
    let n: i64 = caps[1].parse().ok()?;
    if n < 1 {
        return None;
    }
    Some(DateWindow::trailing(today, n))
}

fn calendar_week(txt: &str, today: NaiveDate) -> Option<DateWindow> {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let start = if txt.contains("this week") {
        monday
    } else if txt.contains("last week") {
        monday - Duration::days(7)
    } else {
        return None;
    };
    Some(DateWindow::new(start, start + Duration::days(6)))
}

fn calendar_month(txt: &str, today: NaiveDate) -> Option<DateWindow> {
    let first = first_of_month(today);
    let anchor = if txt.contains("this month") {
        first
    } else if txt.contains("last month") {
        first_of_month(first - Duration::days(1))
    } else {
        return None;
    };
    Some(DateWindow::new(anchor, last_of_month(anchor)))
}

fn month_year(txt: &str) -> Option<DateWindow> {
    let caps = MONTH_YEAR_PATTERN.captures(txt)?;
    let month = month_number(&caps[1])?;
    let first = NaiveDate::from_ymd_opt(caps[2].parse().ok()?, month, 1)?;
    Some(DateWindow::new(first, last_of_month(first)))
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.day0() as i64)
}

/// Last day of `day`'s month: step to the 28th, add four days (always
/// landing in the next month), go back to that month's first, minus a day.
pub fn last_of_month(day: NaiveDate) -> NaiveDate {
    let day28 = day - Duration::days(day.day() as i64 - 28);
    first_of_month(day28 + Duration::days(4)) - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn last_of_month_handles_lengths_and_leap_years() {
        assert_eq!(last_of_month(d(2025, 1, 31)), d(2025, 1, 31));
        assert_eq!(last_of_month(d(2025, 2, 3)), d(2025, 2, 28));
        assert_eq!(last_of_month(d(2024, 2, 29)), d(2024, 2, 29));
        assert_eq!(last_of_month(d(2025, 4, 1)), d(2025, 4, 30));
        assert_eq!(last_of_month(d(2024, 12, 31)), d(2024, 12, 31));
    }
}
