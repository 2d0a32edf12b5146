//! Multi-listing price analytics.
//!
//! Everything here is a pure function of the fetched per-listing series:
//! [`series`] aligns them onto a shared date axis for charting, [`stats`]
//! computes per-listing and pooled statistics, and [`csv_export`] renders
//! the raw rows for download.

pub mod csv_export;
pub mod series;
pub mod stats;

pub use csv_export::{analytics_csv, CSV_HEADER};
pub use series::{build_chart, date_axis, project, ChartSeries, PriceChart, SegmentStyle};
pub use stats::{summarize, PriceStats, StatsTable};

use crate::config;
use crate::models::{Listing, PriceSample};

/// Prices fetched for one listing, in the order the backend returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPrices {
    pub listing_id: i64,
    pub prices: Vec<PriceSample>,
}

/// Chart and statistics computed from one analytics query.
#[derive(Debug, Clone)]
pub struct AnalyticsReport {
    pub results: Vec<ListingPrices>,
    pub chart: PriceChart,
    pub stats: StatsTable,
}

impl AnalyticsReport {
    pub fn build(results: Vec<ListingPrices>, listings: &[Listing]) -> Self {
        let chart = build_chart(&results, listings);
        let stats = StatsTable::build(&results, listings);
        Self {
            results,
            chart,
            stats,
        }
    }
}

/// Display name for a listing id: the listing's name, or `Listing <id>`.
pub fn listing_label(listing_id: i64, listings: &[Listing]) -> String {
    listings
        .iter()
        .find(|l| l.id == listing_id)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| format!("Listing {listing_id}"))
}

/// Palette colour for a listing: its position in `listings`, modulo the
/// palette size. Unknown listings fall back to `fallback_index`.
pub fn listing_color(listing_id: i64, listings: &[Listing], fallback_index: usize) -> &'static str {
    let index = listings
        .iter()
        .position(|l| l.id == listing_id)
        .unwrap_or(fallback_index);
    config::SERIES_COLORS[index % config::SERIES_COLORS.len()]
}
