//! Natural-language analytics over booking records.
//!
//! Answers free-text questions ("top 3 cities last week", "hourly trend
//! yesterday", "degrowth this month") over a caller-supplied
//! [`RecordTable`]. Each question is resolved to a date window, classified
//! into an intent, and answered with aggregation queries run in-process by
//! DuckDB against a private copy of the table.
//!
//! # Quick start
//!
//! ```no_run
//! use bookings_analyst::{Analyst, Record, RecordTable};
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
//! let table = RecordTable::new(vec![
//!     Record::on(day, 1200.0).with_city("Pune").with_source("web"),
//!     Record::on(day, "850").with_city("Mumbai").with_source("app"),
//! ]);
//!
//! let analyst = Analyst::builder().build();
//! let answer = analyst.interpret("top 3 cities yesterday", &table).unwrap();
//! println!("{}", answer.title);
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod dates;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod queries;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncAnalyst;
pub use config::Schema;
pub use connection::Connection;
pub use dispatch::{interpret, Intent};
pub use error::{AnalystError, Result};
pub use models::{
    Column, DateWindow, EnvelopeKind, Metadata, Payload, RawPrice, Record, RecordTable,
    ResultEnvelope, Row,
};
pub use sql_builder::SqlBuilder;

use std::fmt;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// AnalystBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`Analyst`].
///
/// Use [`Analyst::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](AnalystBuilder::build).
#[derive(Default)]
pub struct AnalystBuilder {
    schema: Schema,
    reference: Option<DateTime<Utc>>,
}

impl AnalystBuilder {
    /// Set the column names of the record table.
    ///
    /// Defaults to [`Schema::default()`].
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Pin the instant relative phrases ("yesterday", "last week") are
    /// resolved against.
    ///
    /// If not set, every call uses the current time.
    pub fn reference(mut self, reference: DateTime<Utc>) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn build(self) -> Analyst {
        Analyst {
            schema: self.schema,
            reference: self.reference,
        }
    }
}

// ---------------------------------------------------------------------------
// Analyst
// ---------------------------------------------------------------------------

/// The main entry point: answers queries over record tables.
///
/// Holds configuration only. Tables are passed per call and never modified.
#[derive(Debug, Clone)]
pub struct Analyst {
    schema: Schema,
    reference: Option<DateTime<Utc>>,
}

impl Analyst {
    /// Create a new builder for configuring the analyst.
    pub fn builder() -> AnalystBuilder {
        AnalystBuilder::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference.unwrap_or_else(Utc::now)
    }

    /// Answer `query` over `table`.
    ///
    /// Unrecognized questions still get an answer (the KPI fallback). An
    /// error means the engine itself failed.
    pub fn interpret(&self, query: &str, table: &RecordTable) -> Result<ResultEnvelope> {
        interpret(query, table, &self.schema, self.now())
    }

    /// [`interpret`](Self::interpret) against an explicit reference instant.
    pub fn interpret_at(
        &self,
        query: &str,
        table: &RecordTable,
        reference: DateTime<Utc>,
    ) -> Result<ResultEnvelope> {
        interpret(query, table, &self.schema, reference)
    }

    /// Resolve the date phrase of `query` without running anything.
    pub fn resolve(&self, query: &str) -> Option<DateWindow> {
        dates::resolve(query, self.now())
    }

    /// Copy `table` into a fresh DuckDB connection for direct use of the
    /// query structs in [`queries`].
    pub fn connect(&self, table: &RecordTable) -> Result<Connection> {
        Connection::open(table, &self.schema)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Analyst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = self
            .reference
            .map(|r| r.to_rfc3339())
            .unwrap_or_else(|| "now".to_string());
        write!(
            f,
            "Analyst(table={}, reference={})",
            self.schema.table, reference
        )
    }
}
