//! Period-over-period revenue per city.

use std::cmp::Ordering;

use crate::config::CHANGE_CONVENTION;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{DateWindow, GrowthDecline};

use super::{Dimension, DimensionQuery, RevenueQuery};

// ---------------------------------------------------------------------------
// GrowthQuery
// ---------------------------------------------------------------------------

/// Compares a city's revenue across two windows.
pub struct GrowthQuery<'a> {
    conn: &'a Connection,
}

impl<'a> GrowthQuery<'a> {
    /// Create a new `GrowthQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Revenue of `city` in `previous` and `current`, and the percentage
    /// change between them (see [`CHANGE_CONVENTION`]).
    pub fn growth_decline(
        &self,
        previous: &DateWindow,
        current: &DateWindow,
        city: &str,
    ) -> Result<GrowthDecline> {
        let revenue = RevenueQuery::new(self.conn).for_city(city);
        let previous_revenue = revenue.total_revenue(previous)?;
        let current_revenue = revenue.total_revenue(current)?;

        Ok(GrowthDecline {
            city: city.to_string(),
            previous_revenue,
            current_revenue,
            decline_percent: CHANGE_CONVENTION.percent(previous_revenue, current_revenue),
        })
    }

    /// [`growth_decline`](Self::growth_decline) for every city in the table.
    ///
    /// Sorted by `decline_percent` descending with undefined values last;
    /// equal values keep city order.
    pub fn decline_by_city(
        &self,
        previous: &DateWindow,
        current: &DateWindow,
    ) -> Result<Vec<GrowthDecline>> {
        let cities = DimensionQuery::new(self.conn).distinct_values(Dimension::City)?;

        let mut rows = cities
            .iter()
            .map(|city| self.growth_decline(previous, current, city))
            .collect::<Result<Vec<_>>>()?;

        rows.sort_by(|a, b| match (a.decline_percent, b.decline_percent) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(rows)
    }
}
