//! Ungrouped and time-bucketed revenue queries.

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Column, DailyRevenue, DateWindow, HourlyBookings, Kpis};
use crate::sql_builder::quote_ident;

use super::{number, windowed};

// ---------------------------------------------------------------------------
// RevenueQuery
// ---------------------------------------------------------------------------

/// Revenue totals, KPIs, and daily/hourly trends.
pub struct RevenueQuery<'a> {
    conn: &'a Connection,
    city: Option<&'a str>,
}

impl<'a> RevenueQuery<'a> {
    /// Create a new `RevenueQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, city: None }
    }

    /// Restrict every query to records of one city.
    pub fn for_city(mut self, city: &'a str) -> Self {
        self.city = Some(city);
        self
    }

    /// A city scope on a table without a city column matches nothing.
    fn scope_is_empty(&self) -> bool {
        self.city.is_some() && !self.conn.has_column(Column::City)
    }

    /// Sum of `price` over the window; `0.0` when nothing matches.
    pub fn total_revenue(&self, window: &DateWindow) -> Result<f64> {
        if self.scope_is_empty() {
            return Ok(0.0);
        }
        let price = quote_ident(&self.conn.schema().price);
        let sum = format!("COALESCE(SUM({}), 0.0) AS revenue", price);

        let (sql, params) = windowed(self.conn, window, self.city)
            .select(&[sum.as_str()])
            .build();

        let value = self.conn.execute_scalar(&sql, &params)?;
        Ok(number(value.as_ref()))
    }

    /// Total revenue, booking count, and average price over the window.
    pub fn kpis_summary(&self, window: &DateWindow) -> Result<Kpis> {
        if self.scope_is_empty() {
            return Ok(Kpis {
                total_revenue: 0.0,
                bookings: 0,
                avg_price: 0.0,
            });
        }
        let price = quote_ident(&self.conn.schema().price);
        let sum = format!("COALESCE(SUM({}), 0.0) AS total_revenue", price);

        let (sql, params) = windowed(self.conn, window, self.city)
            .select(&[sum.as_str(), "COUNT(*) AS bookings"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        let row = rows.first();
        let total_revenue = number(row.and_then(|r| r.get("total_revenue")));
        let bookings = row
            .and_then(|r| r.get("bookings"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        let avg_price = if bookings > 0 {
            total_revenue / bookings as f64
        } else {
            0.0
        };

        Ok(Kpis {
            total_revenue,
            bookings,
            avg_price,
        })
    }

    /// Revenue per calendar day, ascending. Days without records are omitted.
    pub fn daily_trend(&self, window: &DateWindow) -> Result<Vec<DailyRevenue>> {
        if self.scope_is_empty() {
            return Ok(Vec::new());
        }
        let schema = self.conn.schema();
        let date = quote_ident(&schema.collection_date);
        let day = format!("{} AS \"day\"", date);
        let sum = format!("SUM({}) AS revenue", quote_ident(&schema.price));

        let (sql, params) = windowed(self.conn, window, self.city)
            .select(&[day.as_str(), sum.as_str()])
            .group_by(&[date.as_str()])
            .order_by(&["\"day\" ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }

    /// Booking count per hour of day, ascending.
    ///
    /// Empty when the table has no time-of-day column. Records whose time
    /// does not parse are left out.
    pub fn hourly_trend(&self, window: &DateWindow) -> Result<Vec<HourlyBookings>> {
        if self.scope_is_empty() || !self.conn.has_column(Column::CollectionTime) {
            return Ok(Vec::new());
        }
        let hour_col = self.conn.schema().hour_column();
        let hour = quote_ident(&hour_col);
        let select_hour = format!("{} AS \"hour\"", hour);

        let (sql, params) = windowed(self.conn, window, self.city)
            .select(&[select_hour.as_str(), "COUNT(*) AS bookings"])
            .where_not_null(&hour_col)
            .group_by(&[hour.as_str()])
            .order_by(&["\"hour\" ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }
}
