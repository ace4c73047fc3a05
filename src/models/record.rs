use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Schema;

// ---------------------------------------------------------------------------
// Column: Optional record columns
// ---------------------------------------------------------------------------

/// Record columns a table may or may not carry.
///
/// `collection_date` and `price` are always present and are not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    CollectionTime,
    City,
    Source,
    Test,
}

impl Column {
    pub const ALL: [Column; 4] = [
        Column::CollectionTime,
        Column::City,
        Column::Source,
        Column::Test,
    ];
}

// ---------------------------------------------------------------------------
// RawPrice: Unparsed price cell
// ---------------------------------------------------------------------------

/// A price cell as delivered by the dataset loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    /// Numeric amount; anything unparseable or non-finite counts as zero.
    pub fn amount(&self) -> f64 {
        let value = match self {
            RawPrice::Number(n) => *n,
            RawPrice::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

impl From<f64> for RawPrice {
    fn from(value: f64) -> Self {
        RawPrice::Number(value)
    }
}

impl From<&str> for RawPrice {
    fn from(value: &str) -> Self {
        RawPrice::Text(value.to_string())
    }
}

impl From<String> for RawPrice {
    fn from(value: String) -> Self {
        RawPrice::Text(value)
    }
}

// ---------------------------------------------------------------------------
// Record: One booking
// ---------------------------------------------------------------------------

/// One transaction/booking row.
///
/// `collection_date` is `None` when the loader could not normalize it; such
/// records never fall inside a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub collection_date: Option<NaiveDateTime>,
    pub collection_time: Option<String>,
    pub price: Option<RawPrice>,
    pub city: Option<String>,
    pub source: Option<String>,
    pub test_mapped: Option<String>,
}

impl Record {
    pub fn new(collection_date: NaiveDateTime, price: impl Into<RawPrice>) -> Self {
        Self {
            collection_date: Some(collection_date),
            collection_time: None,
            price: Some(price.into()),
            city: None,
            source: None,
            test_mapped: None,
        }
    }

    /// Record dated at midnight of `day`.
    pub fn on(day: NaiveDate, price: impl Into<RawPrice>) -> Self {
        Self::new(day.and_time(NaiveTime::MIN), price)
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.collection_time = Some(time.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_test(mut self, test: impl Into<String>) -> Self {
        self.test_mapped = Some(test.into());
        self
    }

    /// Coerced price; a missing cell counts as zero.
    pub fn amount(&self) -> f64 {
        self.price.as_ref().map(RawPrice::amount).unwrap_or(0.0)
    }

    /// Calendar day of `collection_date`.
    pub fn day(&self) -> Option<NaiveDate> {
        self.collection_date.map(|dt| dt.date())
    }

    /// Hour of day (0-23) parsed from `collection_time`.
    pub fn hour(&self) -> Option<u32> {
        self.collection_time.as_deref().and_then(parse_hour)
    }

    /// Value of an optional categorical column.
    pub fn category(&self, column: Column) -> Option<&str> {
        match column {
            Column::CollectionTime => self.collection_time.as_deref(),
            Column::City => self.city.as_deref(),
            Column::Source => self.source.as_deref(),
            Column::Test => self.test_mapped.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordTable: The caller's in-memory dataset
// ---------------------------------------------------------------------------

/// The caller-owned record set plus the optional columns it carries.
///
/// The analyst only ever reads a `RecordTable`; every query works on a copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    records: Vec<Record>,
    columns: BTreeSet<Column>,
}

impl RecordTable {
    /// Build a table, treating an optional column as present when any record
    /// carries a value for it.
    pub fn new(records: Vec<Record>) -> Self {
        let columns = Column::ALL
            .into_iter()
            .filter(|c| records.iter().any(|r| r.category(*c).is_some()))
            .collect();
        Self { records, columns }
    }

    /// Build a table with an explicit set of optional columns.
    pub fn with_columns(records: Vec<Record>, columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            records,
            columns: columns.into_iter().collect(),
        }
    }

    /// Build a table from JSON objects keyed by the schema's column names.
    ///
    /// A column is present when any row has the key, even with a null
    /// value. Date strings that match none of the known timestamp formats
    /// become `None`. Non-object rows are skipped.
    pub fn from_json_rows(rows: &[Value], schema: &Schema) -> Self {
        let mut columns = BTreeSet::new();
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(obj) = row.as_object() else {
                continue;
            };
            for column in Column::ALL {
                if obj.contains_key(schema.column(column)) {
                    columns.insert(column);
                }
            }

            let text = |key: &str| -> Option<String> {
                match obj.get(key) {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    Some(Value::Bool(b)) => Some(b.to_string()),
                    _ => None,
                }
            };

            let price = match obj.get(&schema.price) {
                Some(Value::Number(n)) => n.as_f64().map(RawPrice::Number),
                Some(Value::String(s)) => Some(RawPrice::Text(s.clone())),
                _ => None,
            };

            records.push(Record {
                collection_date: text(&schema.collection_date)
                    .as_deref()
                    .and_then(parse_timestamp),
                collection_time: text(&schema.collection_time),
                price,
                city: text(&schema.city),
                source: text(&schema.source),
                test_mapped: text(&schema.test),
            });
        }

        Self { records, columns }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Normalize a timestamp or bare date string.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Hour of day from a time-of-day or full timestamp string.
pub fn parse_hour(s: &str) -> Option<u32> {
    let trimmed = s.trim();
    let upper = trimmed.to_uppercase();
    if let Some(t) = TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(&upper, f).ok())
    {
        return Some(t.hour());
    }
    // "%I %p" needs minutes for chrono, so "9 PM" is padded first.
    if let Some(hour) = upper
        .strip_suffix("AM")
        .or_else(|| upper.strip_suffix("PM"))
        .and_then(|h| h.trim().parse::<u32>().ok())
        .filter(|h| (1..=12).contains(h))
    {
        let pm = upper.ends_with("PM");
        return Some(match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        });
    }
    parse_timestamp(trimmed).map(|dt| dt.hour())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_price_counts_as_zero() {
        assert_eq!(RawPrice::from("abc").amount(), 0.0);
        assert_eq!(RawPrice::from(" 12.5 ").amount(), 12.5);
        assert_eq!(RawPrice::from("NaN").amount(), 0.0);
        assert_eq!(RawPrice::Number(f64::INFINITY).amount(), 0.0);
    }

    #[test]
    fn hours_parse_from_common_formats() {
        assert_eq!(parse_hour("14:05:00"), Some(14));
        assert_eq!(parse_hour("09:30"), Some(9));
        assert_eq!(parse_hour("9:30 pm"), Some(21));
        assert_eq!(parse_hour("12 AM"), Some(0));
        assert_eq!(parse_hour("2025-01-10 18:45:00"), Some(18));
        assert_eq!(parse_hour("later"), None);
    }

    #[test]
    fn json_rows_detect_columns_by_key() {
        let rows = vec![
            json!({"collection_date": "2025-01-10", "price": "100", "city": "Pune"}),
            json!({"collection_date": "not a date", "price": 50, "source": null}),
        ];
        let table = RecordTable::from_json_rows(&rows, &Schema::default());

        assert_eq!(table.len(), 2);
        assert!(table.has_column(Column::City));
        assert!(table.has_column(Column::Source));
        assert!(!table.has_column(Column::Test));
        assert!(table.records()[1].collection_date.is_none());
        assert_eq!(table.records()[0].amount(), 100.0);
    }

    #[test]
    fn inferred_columns_follow_values() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let table = RecordTable::new(vec![Record::on(day, 10.0).with_city("Pune")]);
        assert!(table.has_column(Column::City));
        assert!(!table.has_column(Column::CollectionTime));
    }
}
