//! Revenue grouped by categorical dimensions (city, source, test type).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{round2, Schema};
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Column, DateWindow, Row};
use crate::sql_builder::{quote_ident, SqlBuilder};

use super::{number, windowed, RevenueQuery};

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

/// A categorical column usable as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    City,
    Source,
    Test,
}

impl Dimension {
    pub fn column(self) -> Column {
        match self {
            Dimension::City => Column::City,
            Dimension::Source => Column::Source,
            Dimension::Test => Column::Test,
        }
    }
}

// ---------------------------------------------------------------------------
// DimensionQuery
// ---------------------------------------------------------------------------

/// Grouped revenue queries. Records with a blank grouping key are left out
/// of every group.
pub struct DimensionQuery<'a> {
    conn: &'a Connection,
    city: Option<&'a str>,
}

impl<'a> DimensionQuery<'a> {
    /// Create a new `DimensionQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, city: None }
    }

    /// Restrict every query to records of one city.
    pub fn for_city(mut self, city: &'a str) -> Self {
        self.city = Some(city);
        self
    }

    fn available(&self, dimension: Dimension) -> bool {
        let scope_ok = self.city.is_none() || self.conn.has_column(Column::City);
        scope_ok && self.conn.has_column(dimension.column())
    }

    fn key_column(&self, dimension: Dimension) -> &str {
        self.conn.schema().column(dimension.column())
    }

    /// The `n` highest-earning cities with their booking counts.
    pub fn top_n_cities(&self, window: &DateWindow, n: usize) -> Result<Vec<Row>> {
        self.grouped(window, Dimension::City, Some(n))
    }

    /// Revenue and bookings per value of `dimension`, highest revenue first.
    ///
    /// Empty when the table lacks the column.
    pub fn dimension_revenue(&self, window: &DateWindow, dimension: Dimension) -> Result<Vec<Row>> {
        self.grouped(window, dimension, None)
    }

    /// [`dimension_revenue`](Self::dimension_revenue) limited to `n` rows.
    pub fn top_dimension(&self, window: &DateWindow, dimension: Dimension, n: usize) -> Result<Vec<Row>> {
        self.grouped(window, dimension, Some(n))
    }

    /// Revenue per group with its share of the window's total revenue.
    ///
    /// `pct_share` is rounded to two decimals, and null for every row when
    /// the window's total revenue is zero.
    pub fn revenue_contribution(&self, window: &DateWindow, group: Dimension) -> Result<Vec<Row>> {
        if !self.available(group) {
            return Ok(Vec::new());
        }
        let mut revenue = RevenueQuery::new(self.conn);
        if let Some(c) = self.city {
            revenue = revenue.for_city(c);
        }
        let total = revenue.total_revenue(window)?;

        let rows = self.grouped(window, group, None)?;
        Ok(rows
            .into_iter()
            .map(|mut row| {
                row.remove("bookings");
                let share = if total == 0.0 {
                    Value::Null
                } else {
                    Value::from(round2(number(row.get("revenue")) / total * 100.0))
                };
                row.insert("pct_share".to_string(), share);
                row
            })
            .collect())
    }

    /// City by source revenue pivot.
    ///
    /// One row per city (ascending), one column per source (ascending), and
    /// `0.0` where a pair has no records. Empty when either column is missing.
    /// A source named like the city column is renamed `"<source> (<source column>)"`.
    pub fn city_source_matrix(&self, window: &DateWindow) -> Result<Vec<Row>> {
        if !self.available(Dimension::City) || !self.available(Dimension::Source) {
            return Ok(Vec::new());
        }
        let schema = self.conn.schema();
        let city = quote_ident(&schema.city);
        let source = quote_ident(&schema.source);
        let select_city = format!("{} AS city", city);
        let select_source = format!("{} AS source", source);
        let sum = format!("SUM({}) AS revenue", quote_ident(&schema.price));

        let (sql, params) = windowed(self.conn, window, self.city)
            .select(&[select_city.as_str(), select_source.as_str(), sum.as_str()])
            .where_present(&schema.city)
            .where_present(&schema.source)
            .group_by(&[city.as_str(), source.as_str()])
            .build();

        let rows = self.conn.execute(&sql, &params)?;

        let mut sources: BTreeSet<String> = BTreeSet::new();
        let mut cells: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for row in &rows {
            let c = row.get("city").and_then(|v| v.as_str()).unwrap_or("");
            let s = row.get("source").and_then(|v| v.as_str()).unwrap_or("");
            sources.insert(s.to_string());
            cells
                .entry(c.to_string())
                .or_default()
                .insert(s.to_string(), number(row.get("revenue")));
        }

        Ok(cells
            .into_iter()
            .map(|(c, by_source)| {
                let mut row = Row::new();
                row.insert(schema.city.clone(), Value::String(c));
                for s in &sources {
                    let v = by_source.get(s).copied().unwrap_or(0.0);
                    row.insert(matrix_column(s, schema), Value::from(v));
                }
                row
            })
            .collect())
    }

    /// Sorted distinct non-blank values of a column across the whole table,
    /// ignoring any date window.
    pub fn distinct_values(&self, dimension: Dimension) -> Result<Vec<String>> {
        if !self.available(dimension) {
            return Ok(Vec::new());
        }
        let schema = self.conn.schema();
        let key = self.key_column(dimension);
        let quoted = quote_ident(key);
        let select = format!("{} AS \"value\"", quoted);

        let mut qb = SqlBuilder::new(&schema.table);
        qb.select(&[select.as_str()])
            .distinct()
            .where_present(key)
            .order_by(&["\"value\" ASC"]);
        if let Some(c) = self.city {
            qb.where_eq(&schema.city, c);
        }

        let (sql, params) = qb.build();
        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("value").and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    /// `{<key>, revenue, bookings}` rows sorted by revenue descending, ties
    /// by key ascending.
    fn grouped(&self, window: &DateWindow, dimension: Dimension, limit: Option<usize>) -> Result<Vec<Row>> {
        if !self.available(dimension) {
            return Ok(Vec::new());
        }
        let schema = self.conn.schema();
        let key = self.key_column(dimension);
        let quoted = quote_ident(key);
        let select_key = format!("{} AS {}", quoted, quoted);
        let sum = format!("SUM({}) AS revenue", quote_ident(&schema.price));
        let tie_break = format!("{} ASC", quoted);

        let mut qb = windowed(self.conn, window, self.city);
        qb.select(&[select_key.as_str(), sum.as_str(), "COUNT(*) AS bookings"])
            .where_present(key)
            .group_by(&[quoted.as_str()])
            .order_by(&["revenue DESC", tie_break.as_str()]);
        // DuckDB limits are BIGINT; anything larger returns every group.
        if let Some(n) = limit.filter(|n| i64::try_from(*n).is_ok()) {
            qb.limit(n);
        }

        let (sql, params) = qb.build();
        self.conn.execute(&sql, &params)
    }
}

/// Column name of one source in the matrix. A source spelled like the city
/// label column is suffixed with the source column name so it cannot
/// overwrite the label.
fn matrix_column(source: &str, schema: &Schema) -> String {
    if source == schema.city {
        format!("{} ({})", source, schema.source)
    } else {
        source.to_string()
    }
}
