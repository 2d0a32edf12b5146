//! Scrape job submission.

use serde_json::Value;
use tracing::{info, warn};

use crate::config;
use crate::connection::Connection;
use crate::error::{PriceMonitorError, Result};
use crate::models::{JobId, ScrapeRequest};

pub struct ScrapeQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ScrapeQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Start a bulk scrape for `season_id`.
    ///
    /// Returns the job id when the backend reported one. A response without
    /// an id is still a successful submission; there is just nothing to watch.
    pub fn submit(&self, season_id: i64, request: &ScrapeRequest) -> Result<Option<JobId>> {
        if request.establishments.is_empty() {
            return Err(PriceMonitorError::Validation(
                "Select at least one listing".into(),
            ));
        }
        let body: Value = self
            .conn
            .post_json(&config::season_scrape_path(season_id), request)?;
        let job_id = JobId::from_response(&body);
        match &job_id {
            Some(id) => info!(season_id, job_id = %id, listings = request.establishments.len(), "scrape submitted"),
            None => warn!(season_id, "scrape accepted without a job id"),
        }
        Ok(job_id)
    }
}
