use serde::Serialize;

use super::{listing_label, ListingPrices};
use crate::models::{Listing, PriceSample};

/// Label of the pooled row.
pub const TOTAL_LABEL: &str = "TOTAL";

/// Price and availability statistics for one listing or for a pooled set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub label: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Percentage of sampled days that were available, rounded to one decimal.
    pub availability_rate: f64,
    pub available_days: usize,
    pub total_days: usize,
}

impl PriceStats {
    /// `<available>/<total> days`
    pub fn days_label(&self) -> String {
        format!("{}/{} days", self.available_days, self.total_days)
    }
}

/// Compute statistics over a set of samples.
///
/// Prices are taken from non-null samples only; with no prices the average,
/// minimum and maximum are all `0`. Every sample counts as one day.
pub fn summarize<'a, I>(label: &str, samples: I) -> PriceStats
where
    I: IntoIterator<Item = &'a PriceSample>,
{
    let mut total_days = 0usize;
    let mut available_days = 0usize;
    let mut prices = Vec::new();

    for sample in samples {
        total_days += 1;
        if sample.is_available() {
            available_days += 1;
        }
        if let Some(price) = sample.price_per_night {
            prices.push(price);
        }
    }

    let (avg_price, min_price, max_price) = if prices.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let sum: f64 = prices.iter().sum();
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (sum / prices.len() as f64, min, max)
    };

    let availability_rate = if total_days > 0 {
        round1(available_days as f64 / total_days as f64 * 100.0)
    } else {
        0.0
    };

    PriceStats {
        label: label.to_string(),
        avg_price,
        min_price,
        max_price,
        availability_rate,
        available_days,
        total_days,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-listing rows plus the pooled total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsTable {
    pub rows: Vec<PriceStats>,
    /// Present only when more than one listing is selected. Pools every
    /// sample across listings rather than averaging the per-listing rows.
    pub total: Option<PriceStats>,
}

impl StatsTable {
    pub fn build(results: &[ListingPrices], listings: &[Listing]) -> Self {
        let rows: Vec<PriceStats> = results
            .iter()
            .map(|r| summarize(&listing_label(r.listing_id, listings), &r.prices))
            .collect();

        let total = (rows.len() > 1).then(|| {
            summarize(
                TOTAL_LABEL,
                results.iter().flat_map(|r| r.prices.iter()),
            )
        });

        Self { rows, total }
    }
}
