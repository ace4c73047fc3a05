use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kpis: Headline numbers for a window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Kpis {
    pub total_revenue: f64,
    pub bookings: i64,
    pub avg_price: f64,
}

// ---------------------------------------------------------------------------
// DailyRevenue: One row of the daily trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyRevenue {
    pub day: String,
    pub revenue: f64,
}

// ---------------------------------------------------------------------------
// HourlyBookings: One row of the hourly trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HourlyBookings {
    pub hour: u32,
    pub bookings: i64,
}

// ---------------------------------------------------------------------------
// GrowthDecline: Period-over-period revenue of one city
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GrowthDecline {
    pub city: String,
    pub previous_revenue: f64,
    pub current_revenue: f64,
    /// Signed by [`CHANGE_CONVENTION`](crate::config::CHANGE_CONVENTION);
    /// `None` when the previous window earned nothing.
    pub decline_percent: Option<f64>,
}
