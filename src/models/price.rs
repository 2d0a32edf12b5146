use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceSample: one listing's price/availability for one calendar date
// ---------------------------------------------------------------------------

/// Row returned by `GET /api/prices/{listing_id}`.
///
/// Every field except `date` may be null or missing; missing keys and
/// explicit nulls both decode to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    #[serde(default)]
    pub id: Option<i64>,
    /// ISO `YYYY-MM-DD`; sorts correctly as a string.
    pub date: String,
    #[serde(default)]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub available_for_checkin: Option<bool>,
    #[serde(default)]
    pub available_for_checkout: Option<bool>,
    #[serde(default)]
    pub bookable: Option<bool>,
    #[serde(default)]
    pub min_nights: Option<i64>,
    #[serde(default)]
    pub max_nights: Option<i64>,
    #[serde(default)]
    pub price_basis_nights: Option<i64>,
    #[serde(default)]
    pub stay_total: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PriceSample {
    /// `true` only when the backend reported the date as available.
    pub fn is_available(&self) -> bool {
        self.available == Some(true)
    }
}

// ---------------------------------------------------------------------------
// DateRange: inclusive analytics/scrape window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").ok()?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").ok()?;
        Some(Self { start, end })
    }

    /// The `days`-long window ending on `today`.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        Self {
            start: today - Duration::days(days),
            end: today,
        }
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}
