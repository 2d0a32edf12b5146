use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::{listing_color, listing_label, ListingPrices};
use crate::models::{Listing, PriceSample};

/// Line style of the segment joining two consecutive chart points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStyle {
    Solid,
    /// At least one endpoint is a gap.
    Dashed,
}

/// One listing's prices projected onto the shared date axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub listing_id: i64,
    pub label: String,
    pub color: &'static str,
    /// One entry per axis date; `None` is a gap, never a zero price.
    pub values: Vec<Option<f64>>,
}

impl ChartSeries {
    /// Styles of the `values.len() - 1` segments between consecutive points.
    pub fn segments(&self) -> Vec<SegmentStyle> {
        self.values
            .windows(2)
            .map(|pair| match (pair[0], pair[1]) {
                (Some(_), Some(_)) => SegmentStyle::Solid,
                _ => SegmentStyle::Dashed,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceChart {
    /// Sorted union of every date present in any series.
    pub dates: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Union of all sample dates, sorted ascending and deduplicated.
///
/// ISO `YYYY-MM-DD` strings sort chronologically as plain strings.
pub fn date_axis(results: &[ListingPrices]) -> Vec<String> {
    results
        .iter()
        .flat_map(|r| r.prices.iter().map(|p| p.date.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Re-project one listing's samples onto `axis`.
///
/// Dates the listing has no sample for, and samples with a null price,
/// become `None`. When a date repeats, the last sample wins.
pub fn project(prices: &[PriceSample], axis: &[String]) -> Vec<Option<f64>> {
    let by_date: HashMap<&str, Option<f64>> = prices
        .iter()
        .map(|p| (p.date.as_str(), p.price_per_night))
        .collect();
    axis.iter()
        .map(|date| by_date.get(date.as_str()).copied().flatten())
        .collect()
}

/// Build the multi-line price chart for a batch of analytics results.
pub fn build_chart(results: &[ListingPrices], listings: &[Listing]) -> PriceChart {
    let dates = date_axis(results);
    let series = results
        .iter()
        .enumerate()
        .map(|(i, r)| ChartSeries {
            listing_id: r.listing_id,
            label: listing_label(r.listing_id, listings),
            color: listing_color(r.listing_id, listings, i),
            values: project(&r.prices, &dates),
        })
        .collect();
    PriceChart { dates, series }
}
