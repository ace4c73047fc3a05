//! Shared test fixtures for the bookings analyst integration tests.
//!
//! Provides `sample_table()`, a small booking set around a fixed reference
//! day (Friday 2025-01-10), so that relative phrases and the default
//! seven-day window resolve to known dates.

#![allow(dead_code)]

use bookings_analyst::{Analyst, Connection, Record, RecordTable, Schema};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Noon UTC on Friday 2025-01-10.
pub fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Route engine logs to the test harness. `RUST_LOG=bookings_analyst=debug`
/// shows rule selection and SQL.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn booking(d: u32, city: &str, source: &str, test: &str, time: &str, price: &str) -> Record {
    let (y, m) = if d >= 28 { (2024, 12) } else { (2025, 1) };
    Record::on(day(y, m, d), price)
        .with_city(city)
        .with_source(source)
        .with_test(test)
        .with_time(time)
}

/// Bookings in the default window (2025-01-04 to 2025-01-10) and the window
/// before it (2024-12-28 to 2025-01-03).
///
/// Current window: 3200 revenue over 8 bookings. Pune 1700, Delhi 700,
/// Mumbai 500, Bengaluru 200, plus 100 from a record with a blank city.
/// One Mumbai price is malformed and counts as zero.
///
/// Previous window: Pune 800, Mumbai 1000, Delhi 700.
pub fn sample_table() -> RecordTable {
    RecordTable::new(vec![
        booking(9, "Pune", "web", "CBC", "10:15:00", "1000"),
        booking(9, "Mumbai", "app", "Lipid", "14:30:00", "500"),
        booking(8, "Pune", "app", "CBC", "10:45:00", "300"),
        booking(7, "Delhi", "web", "Thyroid", "18:00:00", "700"),
        booking(6, "Mumbai", "web", "CBC", "09:00", "abc"),
        booking(5, "Bengaluru", "web", "Lipid", "21:10:00", "200"),
        booking(10, "Pune", "web", "Thyroid", "10:05:00", "400"),
        booking(9, "  ", "web", "CBC", "11:00:00", "100"),
        // previous window
        booking(2, "Pune", "web", "CBC", "10:00:00", "800"),
        booking(1, "Mumbai", "app", "Lipid", "12:00:00", "1000"),
        booking(30, "Delhi", "web", "CBC", "16:00:00", "700"),
    ])
}

/// The same kind of bookings with only date, price, and city.
pub fn minimal_table() -> RecordTable {
    RecordTable::new(vec![
        Record::on(day(2025, 1, 9), 250.0).with_city("Pune"),
        Record::on(day(2025, 1, 8), 150.0).with_city("Mumbai"),
    ])
}

pub fn analyst() -> Analyst {
    init_tracing();
    Analyst::builder().reference(reference()).build()
}

pub fn connect(table: &RecordTable) -> Connection {
    init_tracing();
    Connection::open(table, &Schema::default()).unwrap()
}
