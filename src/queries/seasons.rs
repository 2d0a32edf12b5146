//! Seasons: named date ranges scoped to a workspace.

use chrono::NaiveDate;

use crate::config;
use crate::connection::Connection;
use crate::error::{PriceMonitorError, Result};
use crate::models::{NewSeason, Season};

pub struct SeasonQuery<'a> {
    conn: &'a Connection,
}

impl<'a> SeasonQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self, workspace_id: i64) -> Result<Vec<Season>> {
        self.conn
            .get_json(&config::workspace_seasons_path(workspace_id), &[])
    }

    /// Create a season. Requires a name and a start date not after the end date.
    pub fn create(&self, workspace_id: i64, season: &NewSeason) -> Result<Season> {
        validate(season)?;
        self.conn
            .post_json(&config::workspace_seasons_path(workspace_id), season)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn.delete(&config::season_path(id))
    }
}

fn validate(season: &NewSeason) -> Result<()> {
    if season.name.trim().is_empty() {
        return Err(PriceMonitorError::Validation("Season name is required".into()));
    }
    let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok();
    match (parse(&season.start_date), parse(&season.end_date)) {
        (Some(start), Some(end)) if start <= end => Ok(()),
        (Some(_), Some(_)) => Err(PriceMonitorError::Validation(
            "Season start date must not be after its end date".into(),
        )),
        _ => Err(PriceMonitorError::Validation(
            "Season dates must be YYYY-MM-DD".into(),
        )),
    }
}
