//! Explicit application state shared by the dashboard handlers.

use chrono::NaiveDate;

use crate::config;
use crate::error::{PriceMonitorError, Result};
use crate::models::{DateRange, Listing, Workspace};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Set of listing ids that remembers insertion order.
///
/// Analytics fetches and CSV rows follow this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        if let Some(pos) = self.ids.iter().position(|x| *x == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn insert(&mut self, id: i64) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

impl FromIterator<i64> for Selection {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        let mut selection = Selection::new();
        for id in iter {
            selection.insert(id);
        }
        selection
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Current workspace/season context and the scrape form's selection.
#[derive(Debug, Clone)]
pub struct AppState {
    pub workspace: Option<Workspace>,
    pub season_id: Option<i64>,
    pub scrape_selection: Selection,
    /// Provider chosen in the scrape form.
    pub scrape_provider: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            workspace: None,
            season_id: None,
            scrape_selection: Selection::new(),
            scrape_provider: config::DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl AppState {
    pub fn workspace_id(&self) -> Option<i64> {
        self.workspace.as_ref().map(|w| w.id)
    }

    pub fn require_workspace(&self) -> Result<&Workspace> {
        self.workspace
            .as_ref()
            .ok_or_else(|| PriceMonitorError::Validation("Select a workspace first".into()))
    }

    /// Both a workspace and a season, as required before scraping.
    pub fn require_season(&self) -> Result<(i64, i64)> {
        match (self.workspace_id(), self.season_id) {
            (Some(w), Some(s)) => Ok((w, s)),
            _ => Err(PriceMonitorError::Validation(
                "Select a workspace and a season first".into(),
            )),
        }
    }

    /// Forget the workspace and everything scoped to it.
    pub fn clear_workspace(&mut self) {
        self.workspace = None;
        self.season_id = None;
        self.scrape_selection.clear();
    }
}

// ---------------------------------------------------------------------------
// AnalyticsState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct AnalyticsState {
    pub selection: Selection,
    /// Listings offered for selection; fixes labels and colours.
    pub listings: Vec<Listing>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// `None` means every provider.
    pub provider: Option<String>,
}

impl AnalyticsState {
    /// Fill in the default window (last 30 days) for any unset date.
    pub fn default_range(&mut self, today: NaiveDate) {
        let default = DateRange::last_days(today, config::ANALYTICS_DEFAULT_DAYS);
        self.start.get_or_insert(default.start);
        self.end.get_or_insert(default.end);
    }

    pub fn range(&self) -> Option<DateRange> {
        Some(DateRange::new(self.start?, self.end?))
    }

    /// Set the provider filter; `all` or an empty value clears it.
    pub fn set_provider(&mut self, provider: &str) {
        self.provider = match provider.trim() {
            "" | config::ALL_PROVIDERS => None,
            p => Some(p.to_string()),
        };
    }

    /// Pre-flight check shared by load and export.
    pub fn require_query(&self) -> Result<DateRange> {
        let range = self
            .range()
            .ok_or_else(|| PriceMonitorError::Validation("Select a date range".into()))?;
        if self.selection.is_empty() {
            return Err(PriceMonitorError::Validation(
                "Select at least one listing".into(),
            ));
        }
        Ok(range)
    }
}
