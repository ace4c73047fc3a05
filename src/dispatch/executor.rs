//! Intent execution.
//!
//! Runs the aggregation queries an [`Intent`] needs and wraps the answer in a
//! [`ResultEnvelope`].

use serde::Serialize;
use serde_json::Value;

use crate::config::{CHANGE_CONVENTION, CITY_BREAKDOWN_LIMIT};
use crate::connection::Connection;
use crate::error::{AnalystError, Result};
use crate::models::{Column, DailyRevenue, DateWindow, Payload, ResultEnvelope, Row};
use crate::queries::{Dimension, DimensionQuery, GrowthQuery, RevenueQuery};

use super::intent::Intent;

/// Executes intents against one copied table and date window.
pub struct Executor<'a> {
    conn: &'a Connection,
    window: DateWindow,
}

impl<'a> Executor<'a> {
    pub fn new(conn: &'a Connection, window: DateWindow) -> Self {
        Self { conn, window }
    }

    pub fn run(&self, intent: &Intent) -> Result<ResultEnvelope> {
        let w = &self.window;
        match intent {
            Intent::Compare { left, right } => Ok(ResultEnvelope::text(
                "Comparison",
                format!(
                    "Comparing '{}' vs '{}' is only partially supported; ask for each side separately.",
                    left, right
                ),
                w,
            )),

            Intent::Decline => self.decline(),

            Intent::CitySnapshot { city } => self.city_snapshot(city),

            Intent::TopCities { n } => {
                let rows = DimensionQuery::new(self.conn).top_n_cities(w, *n)?;
                Ok(self.table(format!("Top {} cities by revenue", n), rows))
            }

            Intent::DailyTrend => {
                let rows = to_rows(&RevenueQuery::new(self.conn).daily_trend(w)?)?;
                Ok(self.table(format!("Daily revenue trend ({})", w), rows))
            }

            Intent::HourlyTrend => {
                if !self.conn.has_column(Column::CollectionTime) {
                    return Ok(ResultEnvelope::text(
                        "Hourly trend",
                        "Hourly data is unavailable: the dataset has no collection time.",
                        w,
                    ));
                }
                let rows = to_rows(&RevenueQuery::new(self.conn).hourly_trend(w)?)?;
                Ok(self.table("Hourly bookings", rows))
            }

            Intent::TestRevenue => {
                if !self.conn.has_column(Column::Test) {
                    return Ok(ResultEnvelope::text(
                        "Test-wise revenue",
                        "No test data: the dataset has no test column.",
                        w,
                    ));
                }
                let rows = DimensionQuery::new(self.conn).dimension_revenue(w, Dimension::Test)?;
                Ok(self.table("Test-wise revenue", rows))
            }

            Intent::SourceRevenue => {
                let rows = DimensionQuery::new(self.conn).dimension_revenue(w, Dimension::Source)?;
                Ok(self.table("Revenue by source", rows))
            }

            Intent::Contribution { group } => {
                let rows = DimensionQuery::new(self.conn).revenue_contribution(w, *group)?;
                let label = self.conn.schema().column(group.column()).to_string();
                Ok(self.table(format!("Revenue contribution by {}", label), rows))
            }

            Intent::Matrix => {
                let rows = DimensionQuery::new(self.conn).city_source_matrix(w)?;
                Ok(self.table("City x source revenue matrix", rows))
            }

            Intent::Kpis => self.kpis("KPIs summary"),

            Intent::PeakDay => self.peak_day(),

            Intent::Fallback => self.kpis("KPIs summary (fallback)"),
        }
    }

    fn table(&self, title: impl Into<String>, rows: Vec<Row>) -> ResultEnvelope {
        ResultEnvelope::new(title, Payload::Table(rows), &self.window)
    }

    fn kpis(&self, title: &str) -> Result<ResultEnvelope> {
        let kpis = RevenueQuery::new(self.conn).kpis_summary(&self.window)?;
        Ok(ResultEnvelope::new(title, Payload::Mapping(to_row(&kpis)?), &self.window))
    }

    fn decline(&self) -> Result<ResultEnvelope> {
        let Some(previous) = self.window.previous() else {
            return Ok(ResultEnvelope::text(
                "Revenue growth/decline by city",
                format!("No earlier period of equal length precedes {}.", self.window),
                &self.window,
            ));
        };
        let rows = GrowthQuery::new(self.conn).decline_by_city(&previous, &self.window)?;
        Ok(self
            .table("Revenue growth/decline by city", to_rows(&rows)?)
            .with_previous(&previous))
    }

    /// Without a previous window, `previous_revenue` and `change_percent`
    /// are null and no `prev_*` metadata is attached.
    fn city_snapshot(&self, city: &str) -> Result<ResultEnvelope> {
        let current = self.window;
        let previous = current.previous();

        let revenue = RevenueQuery::new(self.conn).for_city(city);
        let current_revenue = revenue.total_revenue(&current)?;
        let previous_revenue = match &previous {
            Some(p) => Some(revenue.total_revenue(p)?),
            None => None,
        };

        let dims = DimensionQuery::new(self.conn).for_city(city);
        let top_sources = dims.top_dimension(&current, Dimension::Source, CITY_BREAKDOWN_LIMIT)?;

        let mut map = Row::new();
        map.insert("city".to_string(), Value::from(city));
        map.insert("current_revenue".to_string(), Value::from(current_revenue));
        map.insert(
            "previous_revenue".to_string(),
            previous_revenue.map(Value::from).unwrap_or(Value::Null),
        );
        map.insert(
            "change_percent".to_string(),
            previous_revenue
                .and_then(|p| CHANGE_CONVENTION.percent(p, current_revenue))
                .map(Value::from)
                .unwrap_or(Value::Null),
        );
        map.insert("top_sources".to_string(), rows_value(top_sources));
        if self.conn.has_column(Column::Test) {
            let top_tests = dims.top_dimension(&current, Dimension::Test, CITY_BREAKDOWN_LIMIT)?;
            map.insert("top_tests".to_string(), rows_value(top_tests));
        }

        let envelope = ResultEnvelope::new(format!("{} KPIs", city), Payload::Mapping(map), &current);
        Ok(match previous {
            Some(p) => envelope.with_previous(&p),
            None => envelope,
        })
    }

    /// First day with the highest revenue.
    fn peak_day(&self) -> Result<ResultEnvelope> {
        let trend = RevenueQuery::new(self.conn).daily_trend(&self.window)?;
        let peak = trend.iter().fold(None, |best: Option<&DailyRevenue>, row| match best {
            Some(b) if b.revenue >= row.revenue => Some(b),
            _ => Some(row),
        });

        match peak {
            Some(row) => Ok(ResultEnvelope::new(
                "Peak day",
                Payload::Mapping(to_row(row)?),
                &self.window,
            )),
            None => Ok(ResultEnvelope::text(
                "Peak day",
                format!("No revenue recorded from {}.", self.window),
                &self.window,
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_row<T: Serialize>(item: &T) -> Result<Row> {
    match serde_json::to_value(item)? {
        Value::Object(map) => Ok(map),
        other => Err(AnalystError::InvalidArgument(format!(
            "expected an object row, got {}",
            other
        ))),
    }
}

fn to_rows<T: Serialize>(items: &[T]) -> Result<Vec<Row>> {
    items.iter().map(to_row).collect()
}

fn rows_value(rows: Vec<Row>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}
