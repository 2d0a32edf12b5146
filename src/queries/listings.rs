//! Monitored listings.

use crate::config;
use crate::connection::Connection;
use crate::error::{PriceMonitorError, Result};
use crate::models::{Listing, NewListing};

pub struct ListingQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ListingQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every listing, across workspaces.
    pub fn list(&self) -> Result<Vec<Listing>> {
        self.conn.get_json(&config::listings_path(), &[])
    }

    /// Listings belonging to `workspace_id`. The backend returns every
    /// listing; scoping happens here.
    pub fn list_for_workspace(&self, workspace_id: i64) -> Result<Vec<Listing>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|l| l.workspace_id == Some(workspace_id))
            .collect())
    }

    /// Workspace listings that can be scraped on `provider`.
    pub fn for_provider(&self, workspace_id: i64, provider: &str) -> Result<Vec<Listing>> {
        Ok(self
            .list_for_workspace(workspace_id)?
            .into_iter()
            .filter(|l| l.supports(provider))
            .collect())
    }

    pub fn create(&self, listing: &NewListing) -> Result<Listing> {
        if listing.listing_id.trim().is_empty() || listing.name.trim().is_empty() {
            return Err(PriceMonitorError::Validation(
                "Listing id and name are required".into(),
            ));
        }
        self.conn.post_json(&config::listings_path(), listing)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn.delete(&config::listing_path(id))
    }
}
