//! In-memory DuckDB copy of a [`RecordTable`] plus query execution.
//!
//! Every [`Connection`] owns a private database populated from the caller's
//! table at open time. Values are coerced on the way in:
//! - price cells become DOUBLE, unparseable ones `0.0`
//! - `collection_date` is truncated to its `YYYY-MM-DD` day
//! - the hour of day is derived from `collection_time` when that column exists
//!
//! Optional columns the table does not carry are not created, so queries
//! check [`Connection::has_column`] before touching them.

use std::collections::BTreeSet;

use duckdb::{types::ValueRef, Connection as DuckDbConnection, ToSql};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::config::Schema;
use crate::error::Result;
use crate::models::{Column, RecordTable, Row};
use crate::sql_builder::quote_ident;

/// Wraps a DuckDB connection holding one copied record table.
pub struct Connection {
    conn: DuckDbConnection,
    schema: Schema,
    columns: BTreeSet<Column>,
}

impl Connection {
    /// Open an in-memory database and copy `table` into it.
    pub fn open(table: &RecordTable, schema: &Schema) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        let columns: BTreeSet<Column> = table.columns().collect();
        let this = Self {
            conn,
            schema: schema.clone(),
            columns,
        };
        this.create_table()?;
        this.load(table)?;
        debug!(
            rows = table.len(),
            table = %this.schema.table,
            "loaded record table into DuckDB"
        );
        Ok(this)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Whether the copied table carries an optional column.
    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Execute SQL and return results as ordered rows.
    ///
    /// Automatically converts DuckDB types to `serde_json::Value`.
    pub fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>> {
        trace!(%sql, ?params, "execute");
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available after the query has run
        let column_names: Vec<String> = match rows_result.as_ref() {
            Some(st) => st
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            None => Vec::new(),
        };

        let mut out: Vec<Row> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = Row::new();
            for (i, col_name) in column_names.iter().enumerate() {
                let value = convert_value_ref(row.get_ref(i)?);
                map.insert(col_name.clone(), value);
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let item: T = serde_json::from_value(serde_json::Value::Object(row))?;
            results.push(item);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        trace!(%sql, ?params, "execute_scalar");
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }

    /// Optional categorical columns in table order.
    fn category_columns(&self) -> Vec<Column> {
        [Column::City, Column::Source, Column::Test]
            .into_iter()
            .filter(|c| self.has_column(*c))
            .collect()
    }

    fn create_table(&self) -> Result<()> {
        let s = &self.schema;
        let mut defs = vec![
            format!("{} VARCHAR", quote_ident(&s.collection_date)),
            format!("{} DOUBLE NOT NULL", quote_ident(&s.price)),
        ];
        if self.has_column(Column::CollectionTime) {
            defs.push(format!("{} VARCHAR", quote_ident(&s.collection_time)));
            defs.push(format!("{} INTEGER", quote_ident(&s.hour_column())));
        }
        for column in self.category_columns() {
            defs.push(format!("{} VARCHAR", quote_ident(s.column(column))));
        }

        self.conn.execute_batch(&format!(
            "CREATE TABLE {} ({})",
            quote_ident(&s.table),
            defs.join(", ")
        ))?;
        Ok(())
    }

    /// Append a coerced copy of every record, in the column order of
    /// `create_table`.
    fn load(&self, table: &RecordTable) -> Result<()> {
        let has_time = self.has_column(Column::CollectionTime);
        let categories = self.category_columns();

        let mut appender = self.conn.appender(&self.schema.table)?;
        for record in table.records() {
            let day = record.day().map(|d| d.to_string());
            let price = record.amount();
            let time = record.collection_time.clone();
            let hour = record.hour().map(|h| h as i32);
            let labels: Vec<Option<String>> = categories
                .iter()
                .map(|c| record.category(*c).map(str::to_string))
                .collect();

            let mut values: Vec<&dyn ToSql> = Vec::with_capacity(4 + labels.len());
            values.push(&day);
            values.push(&price);
            if has_time {
                values.push(&time);
                values.push(&hour);
            }
            for label in &labels {
                values.push(label);
            }
            appender.append_row(values.as_slice())?;
        }
        appender.flush()?;
        Ok(())
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; try i64, fallback to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        // Dates are stored as text, so other types do not reach the engine's result sets
        _ => serde_json::Value::Null,
    }
}
