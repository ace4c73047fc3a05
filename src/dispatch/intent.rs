//! Intent classification.
//!
//! Queries are matched against [`RULES`] top to bottom and the first matcher
//! that returns an intent wins. Earlier rules shadow later ones, so "top 5
//! cities by revenue" is a top-cities request, never a revenue summary.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TOP_N;
use crate::queries::Dimension;

// ============================================================================
// Intent
// ============================================================================

/// An analytic request recognized in a query, with its extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// "compare X vs Y" (acknowledged, not computed)
    Compare { left: String, right: String },
    /// Period-over-period revenue change for every city
    Decline,
    /// KPIs for one city named in the query
    CitySnapshot { city: String },
    /// Highest-earning cities
    TopCities { n: usize },
    DailyTrend,
    HourlyTrend,
    TestRevenue,
    SourceRevenue,
    /// Share of revenue per group
    Contribution { group: Dimension },
    /// City by source pivot
    Matrix,
    Kpis,
    /// Highest-revenue day in the window
    PeakDay,
    /// Nothing matched; answered with KPIs
    Fallback,
}

// ============================================================================
// Query context
// ============================================================================

/// What a matcher may look at.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    /// Case-folded, trimmed query text.
    pub text: &'a str,
    /// Distinct city values of the table, as stored.
    pub cities: &'a [String],
}

impl<'a> QueryContext<'a> {
    pub fn new(text: &'a str, cities: &'a [String]) -> Self {
        Self { text, cities }
    }

    fn has_any(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.text.contains(w))
    }
}

/// Case-fold and trim a raw query.
pub fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

// ============================================================================
// Rule table
// ============================================================================

pub type Matcher = fn(&QueryContext<'_>) -> Option<Intent>;

/// One entry of the priority table.
pub struct Rule {
    pub name: &'static str,
    pub matcher: Matcher,
}

/// Intent rules in priority order.
pub const RULES: &[Rule] = &[
    Rule { name: "compare", matcher: match_compare },
    Rule { name: "decline", matcher: match_decline },
    Rule { name: "city_snapshot", matcher: match_city },
    Rule { name: "top_n_cities", matcher: match_top_n_cities },
    Rule { name: "top_cities", matcher: match_top_cities },
    Rule { name: "daily_trend", matcher: match_daily },
    Rule { name: "hourly_trend", matcher: match_hourly },
    Rule { name: "test_revenue", matcher: match_test },
    Rule { name: "source_revenue", matcher: match_source },
    Rule { name: "contribution", matcher: match_contribution },
    Rule { name: "matrix", matcher: match_matrix },
    Rule { name: "kpis", matcher: match_kpis },
    Rule { name: "peak_day", matcher: match_peak },
];

/// First matching rule's name and intent, or `("fallback", Fallback)`.
pub fn classify(ctx: &QueryContext<'_>) -> (&'static str, Intent) {
    RULES
        .iter()
        .find_map(|rule| (rule.matcher)(ctx).map(|intent| (rule.name, intent)))
        .unwrap_or(("fallback", Intent::Fallback))
}

// ============================================================================
// Matchers
// ============================================================================

fn match_compare(ctx: &QueryContext<'_>) -> Option<Intent> {
    let caps = COMPARE_PATTERN.captures(ctx.text)?;
    Some(Intent::Compare {
        left: caps[1].trim().to_string(),
        right: caps[2].trim().to_string(),
    })
}

fn match_decline(ctx: &QueryContext<'_>) -> Option<Intent> {
    ctx.has_any(DECLINE_WORDS).then_some(Intent::Decline)
}

/// Longest city name occurring in the query, so "new delhi" beats "delhi".
fn match_city(ctx: &QueryContext<'_>) -> Option<Intent> {
    ctx.cities
        .iter()
        .filter(|c| !c.trim().is_empty() && ctx.text.contains(&c.to_lowercase()))
        .fold(None::<&String>, |best, c| match best {
            Some(b) if b.len() >= c.len() => Some(b),
            _ => Some(c),
        })
        .map(|c| Intent::CitySnapshot { city: c.clone() })
}

/// A count too large for `usize` asks for every city.
fn match_top_n_cities(ctx: &QueryContext<'_>) -> Option<Intent> {
    let caps = TOP_N_CITIES_PATTERN.captures(ctx.text)?;
    let n = caps[1].parse().unwrap_or(usize::MAX);
    Some(Intent::TopCities { n })
}

fn match_top_cities(ctx: &QueryContext<'_>) -> Option<Intent> {
    ctx.has_any(&["top cities", "top city"])
        .then_some(Intent::TopCities { n: DEFAULT_TOP_N })
}

fn match_daily(ctx: &QueryContext<'_>) -> Option<Intent> {
    ctx.has_any(DAILY_WORDS).then_some(Intent::DailyTrend)
}

fn match_hourly(ctx: &QueryContext<'_>) -> Option<Intent> {
    ctx.has_any(HOURLY_WORDS).then_some(Intent::HourlyTrend)
}

fn match_test(ctx: &QueryContext<'_>) -> Option<Intent> {
    TEST_PATTERN.is_match(ctx.text).then_some(Intent::TestRevenue)
}

fn match_source(ctx: &QueryContext<'_>) -> Option<Intent> {
    SOURCE_PATTERN.is_match(ctx.text).then_some(Intent::SourceRevenue)
}

fn match_contribution(ctx: &QueryContext<'_>) -> Option<Intent> {
    if !ctx.has_any(CONTRIBUTION_WORDS) {
        return None;
    }
    let group = if ctx.text.contains("city") {
        Dimension::City
    } else if ctx.text.contains("source") {
        Dimension::Source
    } else {
        Dimension::City
    };
    Some(Intent::Contribution { group })
}

fn match_matrix(ctx: &QueryContext<'_>) -> Option<Intent> {
    ctx.has_any(MATRIX_WORDS).then_some(Intent::Matrix)
}

fn match_kpis(ctx: &QueryContext<'_>) -> Option<Intent> {
    ctx.has_any(KPI_WORDS).then_some(Intent::Kpis)
}

fn match_peak(ctx: &QueryContext<'_>) -> Option<Intent> {
    ctx.has_any(PEAK_WORDS).then_some(Intent::PeakDay)
}

// ============================================================================
// Keywords and patterns
// ============================================================================

const DECLINE_WORDS: &[&str] = &["degrowth", "de-growth", "decline", "declining", "growth"];
const DAILY_WORDS: &[&str] = &["trend", "daily", "day wise", "day-wise", "daywise", "per day"];
const HOURLY_WORDS: &[&str] = &[
    "hourly",
    "peak hour",
    "peak-hour",
    "by hour",
    "per hour",
    "hour wise",
    "hour-wise",
];
const CONTRIBUTION_WORDS: &[&str] = &["contribution", "contribute", "share", "percent", "%"];
const MATRIX_WORDS: &[&str] = &[
    "matrix",
    "pivot",
    "city and source",
    "city x source",
    "city by source",
    "city-source",
];
const KPI_WORDS: &[&str] = &[
    "revenue", "sales", "amount", "kpi", "summary", "overview", "metrics",
];
const PEAK_WORDS: &[&str] = &["max", "maximum", "highest", "peak", "best day"];

static COMPARE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcompare\s+(.+?)\s+(?:vs\.?|versus)\s+(.+)").expect("Invalid regex")
});
static TOP_N_CITIES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btop\s+(\d+)\s+cit(?:y|ies)\b").expect("Invalid regex"));
static TEST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btests?\b").expect("Invalid regex"));
static SOURCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:sources?|channels?)\b").expect("Invalid regex"));

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_text(text: &str, cities: &[String]) -> (&'static str, Intent) {
        let norm = normalize(text);
        classify(&QueryContext::new(&norm, cities))
    }

    #[test]
    fn top_n_beats_revenue() {
        let (name, intent) = classify_text("Revenue of top 5 cities", &[]);
        assert_eq!(name, "top_n_cities");
        assert_eq!(intent, Intent::TopCities { n: 5 });
    }

    #[test]
    fn oversized_top_n_still_means_top_cities() {
        let (name, intent) = classify_text("top 99999999999999999999999 cities", &[]);
        assert_eq!(name, "top_n_cities");
        assert_eq!(intent, Intent::TopCities { n: usize::MAX });
    }

    #[test]
    fn top_cities_without_n_uses_default() {
        let (_, intent) = classify_text("top cities last week", &[]);
        assert_eq!(intent, Intent::TopCities { n: DEFAULT_TOP_N });
    }

    #[test]
    fn compare_extracts_both_sides() {
        let (_, intent) = classify_text("compare Pune vs Mumbai", &[]);
        assert_eq!(
            intent,
            Intent::Compare {
                left: "pune".to_string(),
                right: "mumbai".to_string()
            }
        );
    }

    #[test]
    fn decline_beats_city_mention() {
        let cities = vec!["Pune".to_string()];
        let (_, intent) = classify_text("degrowth in pune", &cities);
        assert_eq!(intent, Intent::Decline);
    }

    #[test]
    fn city_mention_prefers_longest_name() {
        let cities = vec!["Delhi".to_string(), "New Delhi".to_string()];
        let (_, intent) = classify_text("revenue in new delhi", &cities);
        assert_eq!(
            intent,
            Intent::CitySnapshot {
                city: "New Delhi".to_string()
            }
        );
    }

    #[test]
    fn latest_is_not_a_test_keyword() {
        let (name, _) = classify_text("latest revenue", &[]);
        assert_eq!(name, "kpis");
        let (name, _) = classify_text("test wise revenue", &[]);
        assert_eq!(name, "test_revenue");
    }

    #[test]
    fn contribution_groups_by_city_by_default() {
        let (_, intent) = classify_text("revenue contribution", &[]);
        assert_eq!(intent, Intent::Contribution { group: Dimension::City });
    }

    #[test]
    fn peak_hour_is_hourly_not_peak_day() {
        let (name, _) = classify_text("peak hour yesterday", &[]);
        assert_eq!(name, "hourly_trend");
        let (name, _) = classify_text("highest day", &[]);
        assert_eq!(name, "peak_day");
    }

    #[test]
    fn unmatched_query_falls_back() {
        let (name, intent) = classify_text("hello there", &[]);
        assert_eq!(name, "fallback");
        assert_eq!(intent, Intent::Fallback);
    }
}
