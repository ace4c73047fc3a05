//! Date range resolution against a fixed reference instant.

mod common;

use bookings_analyst::dates::{parse_date_phrase, resolve, resolve_now};
use bookings_analyst::DateWindow;
use chrono::{TimeZone, Utc};
use common::{day, reference};

fn window(a: (i32, u32, u32), b: (i32, u32, u32)) -> DateWindow {
    DateWindow::new(day(a.0, a.1, a.2), day(b.0, b.1, b.2))
}

// ---------------------------------------------------------------------------
// Relative phrases
// ---------------------------------------------------------------------------

#[test]
fn yesterday_is_a_single_day() {
    let w = resolve("revenue yesterday", reference()).unwrap();
    assert_eq!(w, DateWindow::single(day(2025, 1, 9)));
}

#[test]
fn today_and_tomorrow() {
    assert_eq!(
        resolve("bookings today", reference()),
        Some(DateWindow::single(day(2025, 1, 10)))
    );
    assert_eq!(
        resolve("bookings tomorrow", reference()),
        Some(DateWindow::single(day(2025, 1, 11)))
    );
}

#[test]
fn last_n_days_includes_today() {
    let w = resolve("Revenue for the last 7 days", reference()).unwrap();
    assert_eq!(w, window((2025, 1, 4), (2025, 1, 10)));
    assert_eq!(w.days(), 7);

    let w = resolve("last 1 day", reference()).unwrap();
    assert_eq!(w, DateWindow::single(day(2025, 1, 10)));
}

#[test]
fn last_zero_days_does_not_match() {
    assert_eq!(resolve("last 0 days", reference()), None);
}

// ---------------------------------------------------------------------------
// Calendar periods
// ---------------------------------------------------------------------------

#[test]
fn weeks_run_monday_to_sunday() {
    assert_eq!(
        resolve("this week", reference()),
        Some(window((2025, 1, 6), (2025, 1, 12)))
    );
    assert_eq!(
        resolve("top cities last week", reference()),
        Some(window((2024, 12, 30), (2025, 1, 5)))
    );
}

#[test]
fn last_month_spans_the_previous_calendar_month() {
    let r = Utc.with_ymd_and_hms(2025, 3, 15, 8, 0, 0).unwrap();
    assert_eq!(
        resolve("revenue last month", r),
        Some(window((2025, 2, 1), (2025, 2, 28)))
    );
    assert_eq!(
        resolve("revenue last month", reference()),
        Some(window((2024, 12, 1), (2024, 12, 31)))
    );
}

#[test]
fn this_month_spans_the_whole_month() {
    assert_eq!(
        resolve("kpis this month", reference()),
        Some(window((2025, 1, 1), (2025, 1, 31)))
    );
}

#[test]
fn month_and_year() {
    assert_eq!(
        resolve("revenue for dec 2024", reference()),
        Some(window((2024, 12, 1), (2024, 12, 31)))
    );
    assert_eq!(
        resolve("sales in february 2024", reference()),
        Some(window((2024, 2, 1), (2024, 2, 29)))
    );
}

// ---------------------------------------------------------------------------
// Explicit dates and ranges
// ---------------------------------------------------------------------------

#[test]
fn between_accepts_either_order() {
    let expected = window((2025, 1, 1), (2025, 1, 5));
    assert_eq!(
        resolve("revenue between 2025-01-01 and 2025-01-05", reference()),
        Some(expected)
    );
    assert_eq!(
        resolve("revenue between 2025-01-05 and 2025-01-01", reference()),
        Some(expected)
    );
}

#[test]
fn between_with_month_names() {
    assert_eq!(
        resolve("between 1 jan 2025 and 5 jan 2025", reference()),
        Some(window((2025, 1, 1), (2025, 1, 5)))
    );
}

#[test]
fn unparseable_between_falls_through() {
    assert_eq!(resolve("between foo and bar", reference()), None);
    assert_eq!(
        resolve("between foo and bar yesterday", reference()),
        Some(DateWindow::single(day(2025, 1, 9)))
    );
}

#[test]
fn between_without_a_second_date_falls_through_to_month_year() {
    assert_eq!(
        resolve("between 5 jan 2025 and", reference()),
        Some(window((2025, 1, 1), (2025, 1, 31)))
    );
}

#[test]
fn on_date_and_bare_tokens() {
    assert_eq!(
        resolve("revenue on 2025-01-05", reference()),
        Some(DateWindow::single(day(2025, 1, 5)))
    );
    assert_eq!(
        resolve("city revenue 2025/01/07", reference()),
        Some(DateWindow::single(day(2025, 1, 7)))
    );
}

#[test]
fn explicit_date_beats_relative_words() {
    assert_eq!(
        resolve("on 2025-01-03 not yesterday", reference()),
        Some(DateWindow::single(day(2025, 1, 3)))
    );
}

#[test]
fn no_temporal_phrase() {
    assert_eq!(resolve("top cities by revenue", reference()), None);
}

#[test]
fn phrase_parser_is_reexported() {
    assert_eq!(
        parse_date_phrase("2 days ago", day(2025, 1, 10)),
        Some(day(2025, 1, 8))
    );
}

// ---------------------------------------------------------------------------
// Oversized and noisy phrases
// ---------------------------------------------------------------------------

#[test]
fn huge_ago_counts_do_not_match() {
    assert_eq!(parse_date_phrase("999999999999999 days ago", day(2025, 1, 10)), None);
    assert_eq!(
        parse_date_phrase("2000000000000000000 weeks ago", day(2025, 1, 10)),
        None
    );
    assert_eq!(
        resolve("between 999999999999999 days ago and today", reference()),
        Some(DateWindow::single(day(2025, 1, 10)))
    );
    assert_eq!(resolve("revenue on 2000000000000000000 weeks ago", reference()), None);
}

#[test]
fn huge_ago_count_still_answers() {
    let env = common::analyst()
        .interpret("revenue on 2000000000000000000 weeks ago", &common::sample_table())
        .unwrap();
    assert_eq!(env.metadata.start, "2025-01-04");
    assert_eq!(env.metadata.end, "2025-01-10");
}

#[test]
fn between_ignores_words_after_the_second_bound() {
    assert_eq!(
        resolve("between 2025-01-01 and 2025-01-05 by city", reference()),
        Some(window((2025, 1, 1), (2025, 1, 5)))
    );
    assert_eq!(
        resolve("between 1 jan 2025 and 5 jan 2025 per source", reference()),
        Some(window((2025, 1, 1), (2025, 1, 5)))
    );
}

// ---------------------------------------------------------------------------
// resolve_now / DateWindow::contains
// ---------------------------------------------------------------------------

#[test]
fn resolve_now_uses_the_current_day() {
    let today = Utc::now().date_naive();
    let w = resolve_now("last 7 days").unwrap();
    // a midnight rollover between the two reads moves `end` by one day
    assert!(w.end == today || w.end == today.succ_opt().unwrap());
    assert_eq!(w.days(), 7);
    assert_eq!(resolve_now("no dates here"), None);
}

#[test]
fn resolved_windows_contain_exactly_their_bounds() {
    let w = resolve("last week", reference()).unwrap();
    assert!(w.contains(day(2024, 12, 30)));
    assert!(w.contains(day(2025, 1, 5)));
    assert!(!w.contains(day(2024, 12, 29)));
    assert!(!w.contains(day(2025, 1, 6)));

    let single = resolve("yesterday", reference()).unwrap();
    assert!(single.contains(day(2025, 1, 9)));
    assert!(!single.contains(day(2025, 1, 10)));
}
