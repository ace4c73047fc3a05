//! Async wrapper around [`Analyst`] for use in async runtimes (Tokio, etc.).
//!
//! Each query copies its table into DuckDB and aggregates it, which is
//! CPU-bound work, so calls run on the blocking thread pool via
//! [`tokio::task::spawn_blocking`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bookings_analyst::{AsyncAnalyst, RecordTable};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let analyst = AsyncAnalyst::builder().build();
//!     let table = Arc::new(RecordTable::default());
//!     let answer = analyst.interpret("kpis last 7 days", table).await.unwrap();
//!     println!("{}", answer.title);
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Schema;
use crate::error::{AnalystError, Result};
use crate::models::{RecordTable, ResultEnvelope};
use crate::{Analyst, AnalystBuilder};

// ---------------------------------------------------------------------------
// AsyncAnalystBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncAnalyst`].
#[derive(Default)]
pub struct AsyncAnalystBuilder {
    inner: AnalystBuilder,
}

impl AsyncAnalystBuilder {
    /// Set the column names of the record table.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.inner = self.inner.schema(schema);
        self
    }

    /// Pin the reference instant for relative date phrases.
    pub fn reference(mut self, reference: DateTime<Utc>) -> Self {
        self.inner = self.inner.reference(reference);
        self
    }

    pub fn build(self) -> AsyncAnalyst {
        AsyncAnalyst {
            inner: Arc::new(self.inner.build()),
        }
    }
}

// ---------------------------------------------------------------------------
// AsyncAnalyst
// ---------------------------------------------------------------------------

/// Async wrapper around [`Analyst`].
///
/// Cheap to clone; clones share configuration.
#[derive(Clone)]
pub struct AsyncAnalyst {
    inner: Arc<Analyst>,
}

impl AsyncAnalyst {
    /// Create a new builder for configuring the async analyst.
    pub fn builder() -> AsyncAnalystBuilder {
        AsyncAnalystBuilder::default()
    }

    /// Run a sync analyst operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Analyst) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let analyst = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&analyst))
            .await
            .map_err(|e| AnalystError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Answer `query` over a shared table.
    pub async fn interpret(&self, query: String, table: Arc<RecordTable>) -> Result<ResultEnvelope> {
        self.run(move |a| a.interpret(&query, &table)).await
    }

    /// Answer `query` against an explicit reference instant.
    pub async fn interpret_at(
        &self,
        query: String,
        table: Arc<RecordTable>,
        reference: DateTime<Utc>,
    ) -> Result<ResultEnvelope> {
        self.run(move |a| a.interpret_at(&query, &table, reference))
            .await
    }
}
