//! Query interpretation: date window resolution, intent classification, and
//! execution.

pub mod executor;
pub mod intent;

pub use executor::Executor;
pub use intent::{classify, normalize, Intent, QueryContext, Rule, RULES};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{Schema, DEFAULT_WINDOW_DAYS};
use crate::connection::Connection;
use crate::dates::resolve;
use crate::error::Result;
use crate::models::{DateWindow, RecordTable, ResultEnvelope};
use crate::queries::{Dimension, DimensionQuery};

/// Answer `query` over `table` as of `reference`.
///
/// Queries without a recognizable date phrase cover the seven days ending on
/// the reference date. The table is copied, never modified.
pub fn interpret(
    query: &str,
    table: &RecordTable,
    schema: &Schema,
    reference: DateTime<Utc>,
) -> Result<ResultEnvelope> {
    let text = normalize(query);
    let window = resolve(&text, reference)
        .unwrap_or_else(|| DateWindow::trailing(reference.date_naive(), DEFAULT_WINDOW_DAYS));

    let conn = Connection::open(table, schema)?;
    let cities = DimensionQuery::new(&conn).distinct_values(Dimension::City)?;

    let (rule, intent) = classify(&QueryContext::new(&text, &cities));
    debug!(query = %text, %window, rule, ?intent, "dispatching query");

    Executor::new(&conn, window).run(&intent)
}
