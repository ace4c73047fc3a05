//! Column names and analysis defaults shared by the loader, the aggregation
//! queries, and the dispatcher.

use crate::models::Column;

/// Length of the window used when a query carries no date phrase.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Row count for "top cities" when the query gives no explicit N.
pub const DEFAULT_TOP_N: usize = 5;

/// Row count of the per-city source and test breakdowns.
pub const CITY_BREAKDOWN_LIMIT: usize = 5;

/// Sign convention of every period-over-period percentage
/// (`decline_percent`, `change_percent`).
///
/// Positive means the current window earned more than the previous one.
pub const CHANGE_CONVENTION: ChangeConvention = ChangeConvention::CurrentOverPrevious;

/// How a period-over-period percentage is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeConvention {
    /// `(current - previous) / previous`: growth is positive.
    CurrentOverPrevious,
    /// `(previous - current) / previous`: decline is positive.
    PreviousOverCurrent,
}

impl ChangeConvention {
    /// Percentage change rounded to two decimals, or `None` when the
    /// previous amount is not positive.
    pub fn percent(self, previous: f64, current: f64) -> Option<f64> {
        if previous <= 0.0 {
            return None;
        }
        let delta = match self {
            Self::CurrentOverPrevious => current - previous,
            Self::PreviousOverCurrent => previous - current,
        };
        Some(round2(delta / previous * 100.0))
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Names of the record columns, and of the in-memory table they are copied
/// into.
///
/// A single `Schema` value is handed to the loader and to every aggregation,
/// so a renamed column only has to change here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub table: String,
    pub collection_date: String,
    pub collection_time: String,
    pub price: String,
    pub city: String,
    pub source: String,
    pub test: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            table: "records".to_string(),
            collection_date: "collection_date".to_string(),
            collection_time: "collection_time".to_string(),
            price: "price".to_string(),
            city: "city".to_string(),
            source: "source".to_string(),
            test: "test_mapped".to_string(),
        }
    }
}

impl Schema {
    /// Column name for one of the optional record columns.
    pub fn column(&self, column: Column) -> &str {
        match column {
            Column::CollectionTime => &self.collection_time,
            Column::City => &self.city,
            Column::Source => &self.source,
            Column::Test => &self.test,
        }
    }

    /// Name of the derived hour-of-day column in the in-memory table.
    pub fn hour_column(&self) -> String {
        format!("{}_hour", self.collection_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_positive_for_growth() {
        assert_eq!(CHANGE_CONVENTION.percent(100.0, 150.0), Some(50.0));
        assert_eq!(CHANGE_CONVENTION.percent(200.0, 150.0), Some(-25.0));
    }

    #[test]
    fn percent_is_undefined_without_a_baseline() {
        assert_eq!(CHANGE_CONVENTION.percent(0.0, 150.0), None);
    }

    #[test]
    fn opposite_convention_flips_the_sign() {
        let c = ChangeConvention::PreviousOverCurrent;
        assert_eq!(c.percent(200.0, 150.0), Some(25.0));
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(33.33333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
    }
}
