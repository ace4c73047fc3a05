//! Pattern catalog for temporal phrases.
//!
//! Patterns run against case-folded text; the resolver decides their order.

use std::sync::LazyLock;

use regex::Regex;

// Resolver patterns
pub static BETWEEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"between\s+(.+?)\s+and\s+(.+)").expect("Invalid regex"));
pub static ON_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bon\s+([^\n,?.]+)").expect("Invalid regex"));
pub static DATE_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,4}[-/]\d{1,2}[-/]\d{1,4}").expect("Invalid regex"));
pub static LAST_N_DAYS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"last\s+(\d{1,3})\s+days?").expect("Invalid regex"));
pub static MONTH_YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b((?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*)\s*(\d{4})\b")
        .expect("Invalid regex")
});

// Phrase parser patterns
pub static ISO_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})$").expect("Invalid regex"));
pub static NUMERIC_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{2}|\d{4})$").expect("Invalid regex")
});
pub static DAY_MONTH_YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?,?\s*(\d{4})?$").expect("Invalid regex")
});
pub static MONTH_DAY_YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s*(\d{4}))?$").expect("Invalid regex")
});
pub static MONTH_ONLY_YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)\.?,?\s*(\d{4})$").expect("Invalid regex"));
pub static AGO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|a|an|one|two|three|four|five|six|seven|eight|nine|ten)\s+(days?|weeks?)\s+ago$")
        .expect("Invalid regex")
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Month number for a full month name or an abbreviation of at least three
/// letters (`"sept"` included).
pub fn month_number(word: &str) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(word))
        .map(|i| i as u32 + 1)
}

/// Small counts written as digits or words.
pub fn count_word(word: &str) -> Option<i64> {
    match word {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        _ => word.parse().ok(),
    }
}
