use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Season: a date range inside a workspace
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    #[serde(default)]
    pub workspace_id: Option<i64>,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

impl Season {
    /// Length of the season in days, `None` when either date is not `YYYY-MM-DD`.
    pub fn duration_days(&self) -> Option<i64> {
        let start = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").ok()?;
        let end = NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d").ok()?;
        Some((end - start).num_days())
    }

    /// Selector label, e.g. `High season (2025-01-01 → 2025-02-28)`.
    pub fn label(&self) -> String {
        format!("{} ({} → {})", self.name, self.start_date, self.end_date)
    }
}

/// Body for `POST /api/workspaces/{id}/seasons`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSeason {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}
