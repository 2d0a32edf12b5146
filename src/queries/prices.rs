//! Price history per listing.

use std::thread;

use tracing::debug;

use crate::analytics::ListingPrices;
use crate::config;
use crate::connection::Connection;
use crate::error::{PriceMonitorError, Result};
use crate::models::{DateRange, PriceSample};
use crate::query_builder::QueryBuilder;

pub struct PriceQuery<'a> {
    conn: &'a Connection,
}

impl<'a> PriceQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Samples for one listing inside `range`, optionally restricted to one
    /// provider. `None` (or `all`) means every provider.
    pub fn history(
        &self,
        listing_id: i64,
        range: &DateRange,
        provider: Option<&str>,
    ) -> Result<Vec<PriceSample>> {
        let provider = provider.filter(|p| *p != config::ALL_PROVIDERS);
        let params = QueryBuilder::new()
            .param("start_date", &range.start_str())
            .param("end_date", &range.end_str())
            .param_opt("provider", provider)
            .build();
        self.conn.get_json(&config::prices_path(listing_id), &params)
    }

    /// Fetch several listings concurrently.
    ///
    /// Results come back in the order of `listing_ids`. If any fetch fails the
    /// whole batch fails with the first error in that order.
    pub fn batch(
        &self,
        listing_ids: &[i64],
        range: &DateRange,
        provider: Option<&str>,
    ) -> Result<Vec<ListingPrices>> {
        debug!(listings = listing_ids.len(), "fetching price batch");
        thread::scope(|scope| {
            let handles: Vec<_> = listing_ids
                .iter()
                .map(|&listing_id| {
                    scope.spawn(move || {
                        self.history(listing_id, range, provider)
                            .map(|prices| ListingPrices { listing_id, prices })
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(PriceMonitorError::Internal("price fetch panicked".into()))
                    })
                })
                .collect()
        })
    }
}
