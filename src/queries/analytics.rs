//! Analytics queries: fetch a price batch, then compute chart, stats or CSV.

use crate::analytics::{self, AnalyticsReport, ListingPrices};
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{DateRange, Listing};
use crate::state::Selection;

use super::prices::PriceQuery;

pub struct AnalyticsQuery<'a> {
    conn: &'a Connection,
}

impl<'a> AnalyticsQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Raw per-listing series in selection order.
    pub fn fetch(
        &self,
        selection: &Selection,
        range: &DateRange,
        provider: Option<&str>,
    ) -> Result<Vec<ListingPrices>> {
        PriceQuery::new(self.conn).batch(selection.ids(), range, provider)
    }

    /// Chart and statistics for the selection. `listings` supplies labels and
    /// colours.
    pub fn report(
        &self,
        selection: &Selection,
        listings: &[Listing],
        range: &DateRange,
        provider: Option<&str>,
    ) -> Result<AnalyticsReport> {
        let results = self.fetch(selection, range, provider)?;
        Ok(AnalyticsReport::build(results, listings))
    }

    /// CSV text for the selection.
    pub fn export_csv(
        &self,
        selection: &Selection,
        listings: &[Listing],
        range: &DateRange,
        provider: Option<&str>,
    ) -> Result<String> {
        let results = self.fetch(selection, range, provider)?;
        analytics::analytics_csv(&results, listings)
    }
}
