//! Aggregation queries over a copied record table.
//!
//! Each module provides a query struct that borrows a
//! [`Connection`](crate::connection::Connection) and exposes methods returning
//! `Result<T>`. Every method rebuilds its own date filter, so calls never
//! share intermediate results.

pub mod dimensions;
pub mod growth;
pub mod revenue;

pub use dimensions::{Dimension, DimensionQuery};
pub use growth::GrowthQuery;
pub use revenue::RevenueQuery;

use crate::connection::Connection;
use crate::models::DateWindow;
use crate::sql_builder::SqlBuilder;

/// Builder over the record table restricted to `window`, and to one city
/// when `city` is set.
pub(crate) fn windowed(conn: &Connection, window: &DateWindow, city: Option<&str>) -> SqlBuilder {
    let schema = conn.schema();
    let (start, end) = window.bounds();
    let mut qb = SqlBuilder::new(&schema.table);
    qb.where_between(&schema.collection_date, &start, &end);
    if let Some(c) = city {
        qb.where_eq(&schema.city, c);
    }
    qb
}

/// Read a numeric cell, treating NULL and missing as zero.
pub(crate) fn number(value: Option<&serde_json::Value>) -> f64 {
    value.and_then(|v| v.as_f64()).unwrap_or(0.0)
}
