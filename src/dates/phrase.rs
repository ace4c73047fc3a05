//! Single-date phrase parser.
//!
//! Turns one date token ("2025-01-05", "5 jan 2025", "yesterday",
//! "3 days ago") into a calendar date relative to a reference day. Input
//! that is not entirely a date yields `None`.

use chrono::{Datelike, Duration, NaiveDate};

use super::lexicon::{
    count_word, month_number, AGO_PATTERN, DAY_MONTH_YEAR_PATTERN, ISO_DATE_PATTERN,
    MONTH_DAY_YEAR_PATTERN, MONTH_ONLY_YEAR_PATTERN, NUMERIC_DATE_PATTERN,
};

/// Parse a date phrase relative to `reference`.
///
/// Numeric `A-B-C` dates with the year last are read month-first, falling
/// back to day-first when the month-first reading is not a valid date.
pub fn parse_date_phrase(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let lowered = text.to_lowercase();
    let s = lowered
        .trim()
        .trim_end_matches(|c: char| matches!(c, '?' | '.' | '!' | ',' | ';'))
        .trim();

    match s {
        "today" | "now" => return Some(reference),
        "yesterday" => return Some(reference - Duration::days(1)),
        "tomorrow" => return Some(reference + Duration::days(1)),
        _ => {}
    }

    if let Some(caps) = AGO_PATTERN.captures(s) {
        let n = count_word(&caps[1])?;
        let days = if caps[2].starts_with("week") { n.checked_mul(7)? } else { n };
        return reference.checked_sub_signed(Duration::try_days(days)?);
    }

    if let Some(caps) = ISO_DATE_PATTERN.captures(s) {
        return NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?);
    }

    if let Some(caps) = NUMERIC_DATE_PATTERN.captures(s) {
        let a: u32 = caps[1].parse().ok()?;
        let b: u32 = caps[2].parse().ok()?;
        let year = expand_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, a, b).or_else(|| NaiveDate::from_ymd_opt(year, b, a));
    }

    if let Some(caps) = MONTH_ONLY_YEAR_PATTERN.captures(s) {
        if let Some(month) = month_number(&caps[1]) {
            return NaiveDate::from_ymd_opt(caps[2].parse().ok()?, month, 1);
        }
    }

    if let Some(caps) = DAY_MONTH_YEAR_PATTERN.captures(s) {
        if let Some(month) = month_number(&caps[2]) {
            let year = match caps.get(3) {
                Some(y) => y.as_str().parse().ok()?,
                None => reference.year(),
            };
            return NaiveDate::from_ymd_opt(year, month, caps[1].parse().ok()?);
        }
    }

    if let Some(caps) = MONTH_DAY_YEAR_PATTERN.captures(s) {
        if let Some(month) = month_number(&caps[1]) {
            let year = match caps.get(3) {
                Some(y) => y.as_str().parse().ok()?,
                None => reference.year(),
            };
            return NaiveDate::from_ymd_opt(year, month, caps[2].parse().ok()?);
        }
    }

    None
}

fn expand_year(s: &str) -> Option<i32> {
    let y: i32 = s.parse().ok()?;
    Some(if s.len() == 2 { 2000 + y } else { y })
}
