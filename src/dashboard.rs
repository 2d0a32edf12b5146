//! Dashboard controller.
//!
//! [`Dashboard`] owns the explicit application state and exposes one method
//! per user action. Every handler validates its preconditions first (a failed
//! check is a warning toast and no request), then talks to the backend and
//! pushes the outcome through [`Ui`]. Errors are reported to the user and
//! returned to the caller; they never leave the state half-updated.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error, info, warn};

use crate::analytics::AnalyticsReport;
use crate::browser::{DatabaseBrowser, FilterInput};
use crate::config;
use crate::error::{PriceMonitorError, Result};
use crate::export::{self, ExportWriter};
use crate::models::{
    JobId, Listing, NewListing, NewSeason, Page, ScrapeParams, ScrapeRequest, Season,
    Table, Workspace,
};
use crate::monitor::{Closure, JobMonitor, RefreshHook};
use crate::state::{AnalyticsState, AppState};
use crate::ui::{ToastLevel, Ui};
use crate::PriceMonitorSdk;

// ---------------------------------------------------------------------------
// Handler inputs and outputs
// ---------------------------------------------------------------------------

/// Counters shown in the dashboard header for the current workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub listings: usize,
    pub seasons: usize,
}

/// Values from the bulk scrape form. Blank fields take the defaults.
#[derive(Debug, Clone, Default)]
pub struct ScrapeForm {
    pub guests: Option<u32>,
    pub currency: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

impl ScrapeForm {
    fn params(&self) -> ScrapeParams {
        ScrapeParams {
            guests: self.guests.unwrap_or(config::DEFAULT_GUESTS),
            currency: self
                .currency
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(config::DEFAULT_CURRENCY)
                .to_string(),
            start_date: self.start_date.trim().to_string(),
            end_date: self.end_date.trim().to_string(),
        }
    }
}

/// Result of a successful scrape submission.
#[derive(Debug)]
pub struct ScrapeStarted {
    pub job_id: Option<JobId>,
    /// Monitor thread for the job; `None` when the backend returned no id.
    pub watcher: Option<JoinHandle<Closure>>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct Dashboard {
    sdk: PriceMonitorSdk,
    ui: Arc<dyn Ui>,
    monitor: JobMonitor,
    state: AppState,
    analytics: AnalyticsState,
    browser: DatabaseBrowser,
}

impl Dashboard {
    pub fn new(sdk: PriceMonitorSdk, ui: Arc<dyn Ui>) -> Self {
        let monitor = sdk.monitor(Arc::clone(&ui));
        Self {
            sdk,
            ui,
            monitor,
            state: AppState::default(),
            analytics: AnalyticsState::default(),
            browser: DatabaseBrowser::new(),
        }
    }

    pub fn sdk(&self) -> &PriceMonitorSdk {
        &self.sdk
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn analytics(&self) -> &AnalyticsState {
        &self.analytics
    }

    pub fn browser(&self) -> &DatabaseBrowser {
        &self.browser
    }

    pub fn monitor(&self) -> &JobMonitor {
        &self.monitor
    }

    // -- Workspaces --------------------------------------------------------

    /// Load workspaces and auto-select the only one if nothing is selected.
    pub fn load_workspaces(&mut self) -> Result<Vec<Workspace>> {
        let workspaces = self.report("Failed to load workspaces", self.sdk.workspaces().list())?;
        self.ui.show_workspaces(&workspaces);
        if workspaces.len() == 1 && self.state.workspace.is_none() {
            self.select_workspace(Some(workspaces[0].id))?;
        }
        Ok(workspaces)
    }

    /// Switch workspace, or clear it with `None`.
    ///
    /// A different workspace drops the season and scrape selection, then
    /// seasons, listings and stats are reloaded.
    pub fn select_workspace(&mut self, id: Option<i64>) -> Result<()> {
        let Some(id) = id else {
            self.state.clear_workspace();
            info!("workspace cleared");
            return Ok(());
        };
        let workspace = self.report("Failed to load workspace", self.sdk.workspaces().get(id))?;
        if self.state.workspace_id() != Some(workspace.id) {
            self.state.clear_workspace();
        }
        info!(workspace_id = workspace.id, name = %workspace.name, "workspace selected");
        self.state.workspace = Some(workspace);
        self.load_seasons()?;
        self.load_listings()?;
        self.update_stats()?;
        Ok(())
    }

    pub fn create_workspace(&mut self, name: &str) -> Result<Workspace> {
        let created = self.report("Failed to create workspace", self.sdk.workspaces().create(name))?;
        self.load_workspaces()?;
        self.select_workspace(Some(created.id))?;
        self.ui.toast(ToastLevel::Success, "✅ Workspace created");
        Ok(created)
    }

    pub fn rename_workspace(&mut self, name: &str) -> Result<()> {
        let id = self.report("Rename workspace", self.state.require_workspace().map(|w| w.id))?;
        self.report("Failed to update workspace", self.sdk.workspaces().rename(id, name))?;
        if let Some(ws) = self.state.workspace.as_mut() {
            ws.name = name.trim().to_string();
        }
        self.load_workspaces()?;
        self.ui.toast(ToastLevel::Success, "✅ Workspace updated");
        Ok(())
    }

    /// Delete the current workspace after confirmation.
    pub fn delete_workspace(&mut self) -> Result<()> {
        let ws = self.report("Delete workspace", self.state.require_workspace().cloned())?;
        self.confirm(&format!(
            "Workspace \"{}\" and all of its data will be deleted.",
            ws.name
        ))?;
        self.report("Failed to delete workspace", self.sdk.workspaces().delete(ws.id))?;
        self.state.clear_workspace();
        self.ui.toast(ToastLevel::Success, "✅ Workspace deleted");
        self.load_workspaces()?;
        Ok(())
    }

    // -- Seasons -----------------------------------------------------------

    /// Load the workspace's seasons.
    ///
    /// With none, the season selection is cleared; with exactly one and
    /// nothing selected, it is auto-selected. A selection that no longer
    /// exists is dropped.
    pub fn load_seasons(&mut self) -> Result<Vec<Season>> {
        let Some(ws) = self.state.workspace_id() else {
            return Ok(Vec::new());
        };
        let seasons = self.report("Failed to load seasons", self.sdk.seasons().list(ws))?;
        match self.state.season_id {
            Some(id) if !seasons.iter().any(|s| s.id == id) => self.state.season_id = None,
            _ => {}
        }
        if self.state.season_id.is_none() && seasons.len() == 1 {
            self.state.season_id = Some(seasons[0].id);
        }
        self.ui.show_seasons(&seasons);
        Ok(seasons)
    }

    pub fn select_season(&mut self, id: Option<i64>) {
        debug!(season_id = ?id, "season selected");
        self.state.season_id = id;
    }

    pub fn create_season(&mut self, season: &NewSeason) -> Result<Season> {
        let ws = self.report("Create season", self.state.require_workspace().map(|w| w.id))?;
        let created = self.report("Failed to create season", self.sdk.seasons().create(ws, season))?;
        self.load_seasons()?;
        self.ui.toast(ToastLevel::Success, "✅ Season created");
        Ok(created)
    }

    pub fn delete_season(&mut self, id: i64, name: &str) -> Result<()> {
        self.confirm(&format!("Season \"{name}\" will be deleted."))?;
        self.report("Failed to delete season", self.sdk.seasons().delete(id))?;
        if self.state.season_id == Some(id) {
            self.state.season_id = None;
        }
        self.load_seasons()?;
        self.ui.toast(ToastLevel::Success, "✅ Season deleted");
        Ok(())
    }

    // -- Listings ----------------------------------------------------------

    pub fn load_listings(&mut self) -> Result<Vec<Listing>> {
        let Some(ws) = self.state.workspace_id() else {
            return Ok(Vec::new());
        };
        let listings = self.report(
            "Failed to load listings",
            self.sdk.listings().list_for_workspace(ws),
        )?;
        self.ui.show_listings(&listings);
        Ok(listings)
    }

    /// Add a listing to the current workspace.
    pub fn create_listing(&mut self, mut listing: NewListing) -> Result<Listing> {
        let ws = self.report("Add listing", self.state.require_workspace().map(|w| w.id))?;
        listing.workspace_id = Some(ws);
        let created = self.report("Failed to add listing", self.sdk.listings().create(&listing))?;
        self.load_listings()?;
        self.ui.toast(ToastLevel::Success, "✅ Listing added");
        Ok(created)
    }

    pub fn delete_listing(&mut self, id: i64, name: &str) -> Result<()> {
        self.confirm(&format!("Listing \"{name}\" will be deleted."))?;
        self.report("Failed to delete listing", self.sdk.listings().delete(id))?;
        self.load_listings()?;
        self.ui.toast(ToastLevel::Success, "✅ Listing deleted");
        Ok(())
    }

    // -- Scraping ----------------------------------------------------------

    /// Workspace listings that can be scraped with the chosen provider.
    pub fn scraping_listings(&self) -> Result<Vec<Listing>> {
        let Some(ws) = self.state.workspace_id() else {
            return Ok(Vec::new());
        };
        self.report(
            "Failed to load listings",
            self.sdk.listings().for_provider(ws, &self.state.scrape_provider),
        )
    }

    /// Change the scrape provider. The listing selection is cleared since it
    /// may contain listings the new provider cannot scrape.
    pub fn set_scrape_provider(&mut self, provider: &str) {
        self.state.scrape_provider = provider.trim().to_string();
        self.state.scrape_selection.clear();
    }

    pub fn toggle_scrape_listing(&mut self, id: i64) -> bool {
        self.state.scrape_selection.toggle(id)
    }

    /// Submit a bulk scrape for the selected listings and start watching the job.
    ///
    /// After the job completes successfully, seasons, listings and stats are
    /// re-fetched once, `refresh_delay` later.
    pub fn start_bulk_scrape(&mut self, form: &ScrapeForm) -> Result<ScrapeStarted> {
        let (ws, season_id) = self.report("Start scrape", self.state.require_season())?;
        if self.state.scrape_selection.is_empty() {
            return self.report(
                "Start scrape",
                Err(PriceMonitorError::Validation(
                    "Select at least one listing".into(),
                )),
            );
        }

        let request = ScrapeRequest {
            establishments: self.state.scrape_selection.ids().to_vec(),
            platform: self.state.scrape_provider.clone(),
            params: form.params(),
        };
        let job_id = match self.sdk.scrape().submit(season_id, &request) {
            Ok(job_id) => job_id,
            Err(e) => {
                error!(season_id, error = %e, "scrape submission failed");
                self.ui
                    .toast(ToastLevel::Danger, &format!("Error: {}", user_message(&e)));
                return Err(e);
            }
        };

        let started = match &job_id {
            Some(id) => format!("✅ Job {id} started"),
            None => "✅ Scrape started".to_string(),
        };
        self.ui.toast(ToastLevel::Success, &started);
        self.state.scrape_selection.clear();

        let watcher = job_id.clone().map(|id| {
            let hook = self.refresh_hook(ws);
            self.monitor.connect(id, Some(hook))
        });
        Ok(ScrapeStarted { job_id, watcher })
    }

    /// Post-job refresh for workspace `ws`. Re-fetches and re-renders only.
    fn refresh_hook(&self, ws: i64) -> RefreshHook {
        let sdk = self.sdk.clone();
        let ui = Arc::clone(&self.ui);
        Arc::new(move || refresh_views(&sdk, ui.as_ref(), ws))
    }

    pub fn update_stats(&self) -> Result<DashboardStats> {
        let Some(ws) = self.state.workspace_id() else {
            return Ok(DashboardStats::default());
        };
        let stats = self.report("Failed to update stats", fetch_stats(&self.sdk, ws))?;
        self.ui.show_stats(&stats);
        Ok(stats)
    }

    // -- Analytics ---------------------------------------------------------

    /// Prepare the analytics view: the current workspace's listings (every
    /// listing when none is selected), plus the default window for any date
    /// not set yet.
    pub fn load_analytics_tab(&mut self) -> Result<Vec<Listing>> {
        self.analytics.default_range(chrono::Local::now().date_naive());
        let fetched = match self.state.workspace_id() {
            Some(ws) => self.sdk.listings().list_for_workspace(ws),
            None => self.sdk.listings().list(),
        };
        let listings = self.report("Failed to load listings", fetched)?;
        self.analytics.listings = listings.clone();
        Ok(listings)
    }

    /// Toggle a listing in the analytics selection; reloads the report when
    /// the selection is non-empty and both dates are set.
    pub fn toggle_analytics_listing(&mut self, id: i64) -> Result<Option<AnalyticsReport>> {
        self.analytics.selection.toggle(id);
        if self.analytics.selection.is_empty() || self.analytics.range().is_none() {
            return Ok(None);
        }
        self.load_analytics().map(Some)
    }

    pub fn set_analytics_range(
        &mut self,
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    ) {
        self.analytics.start = start;
        self.analytics.end = end;
    }

    pub fn set_analytics_provider(&mut self, provider: &str) {
        self.analytics.set_provider(provider);
    }

    /// Fetch every selected listing and render chart and statistics.
    pub fn load_analytics(&self) -> Result<AnalyticsReport> {
        let range = self.report("Load analytics", self.analytics.require_query())?;
        let report = self.report(
            "Failed to load analytics",
            self.sdk.analytics().report(
                &self.analytics.selection,
                &self.analytics.listings,
                &range,
                self.analytics.provider.as_deref(),
            ),
        )?;
        self.ui.show_chart(&report.chart);
        self.ui.show_price_stats(&report.stats);
        Ok(report)
    }

    /// Write the selected listings' rows to `analytics_<start>_<end>.csv`.
    pub fn export_analytics(&self) -> Result<PathBuf> {
        let range = self.report("Export analytics", self.analytics.require_query())?;
        let csv = self.report(
            "Failed to export analytics",
            self.sdk.analytics().export_csv(
                &self.analytics.selection,
                &self.analytics.listings,
                &range,
                self.analytics.provider.as_deref(),
            ),
        )?;
        let path = self.report(
            "Failed to export analytics",
            self.write_export(&export::analytics_file_name(&range), csv.as_bytes()),
        )?;
        self.ui.toast(ToastLevel::Success, "CSV exported");
        Ok(path)
    }

    // -- Database browser --------------------------------------------------

    /// Switch the browser to `table` and fetch its first page.
    pub fn load_database_table(&mut self, table: Table) -> Result<Page> {
        self.browser.select_table(table);
        self.fetch_database_page()
    }

    pub fn apply_database_filters(&mut self, input: &FilterInput) -> Result<Page> {
        self.browser.apply_filters(&self.state, input);
        self.fetch_database_page()
    }

    /// Fetch the browser's current page and render it.
    pub fn fetch_database_page(&mut self) -> Result<Page> {
        let page = self.report(
            "Failed to load data",
            self.sdk
                .database()
                .page(self.browser.table, &self.browser.page_query()),
        )?;
        self.browser.total = page.total;
        self.ui.show_table(&page.columns(), &page);
        Ok(page)
    }

    pub fn sort_database(&mut self, column: &str) -> Result<Page> {
        self.browser.toggle_sort(column);
        self.fetch_database_page()
    }

    /// Next page, or `None` when already on the last one.
    pub fn next_database_page(&mut self) -> Result<Option<Page>> {
        if !self.browser.next_page() {
            return Ok(None);
        }
        self.fetch_database_page().map(Some)
    }

    /// Previous page, or `None` when already on the first one.
    pub fn prev_database_page(&mut self) -> Result<Option<Page>> {
        if !self.browser.prev_page() {
            return Ok(None);
        }
        self.fetch_database_page().map(Some)
    }

    pub fn go_to_database_page(&mut self, page: u32) -> Result<Page> {
        self.browser.go_to(page);
        self.fetch_database_page()
    }

    /// Download the filtered table as `<table>_export_<date>.csv`.
    pub fn export_database_table(&self) -> Result<PathBuf> {
        let table = self.browser.table;
        if table.export_path().is_none() {
            return self.report(
                "Export",
                Err(PriceMonitorError::Validation(format!(
                    "Export is not available for '{table}'"
                ))),
            );
        }
        let bytes = self.report(
            "Failed to export data",
            self.sdk.database().export(table, &self.browser.filter_query()),
        )?;
        let file_name =
            export::table_export_file_name(table, chrono::Local::now().date_naive());
        let path = self.report("Failed to export data", self.write_export(&file_name, &bytes))?;
        self.ui.toast(ToastLevel::Success, "Data exported");
        Ok(path)
    }

    /// Delete every row matching the browser's filters, after confirmation,
    /// then reload the page. Returns the server's summary message.
    pub fn delete_filtered_records(&mut self) -> Result<String> {
        let table = self.browser.table;
        if table.delete_path().is_none() {
            return self.report(
                "Delete",
                Err(PriceMonitorError::Validation(format!(
                    "Records cannot be deleted from '{table}'"
                ))),
            );
        }
        self.confirm(&self.browser.delete_confirmation())?;
        let message = match self
            .sdk
            .database()
            .delete(table, &self.browser.filter_query())
        {
            Ok(message) => message,
            Err(e) => {
                error!(table = %table, error = %e, "bulk delete failed");
                self.ui.toast(ToastLevel::Danger, &user_message(&e));
                return Err(e);
            }
        };
        self.ui.toast(ToastLevel::Success, &message);
        self.fetch_database_page()?;
        Ok(message)
    }

    // -- Helpers -----------------------------------------------------------

    fn confirm(&self, message: &str) -> Result<()> {
        if self.ui.confirm(message) {
            Ok(())
        } else {
            debug!("{message} (declined)");
            Err(PriceMonitorError::Cancelled(message.to_string()))
        }
    }

    fn write_export(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        let writer: ExportWriter = self.sdk.exporter()?;
        writer.write(file_name, contents)
    }

    /// Surface a failed result to the user and hand it back unchanged.
    fn report<T>(&self, context: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            notify(self.ui.as_ref(), context, e);
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn notify(ui: &dyn Ui, context: &str, e: &PriceMonitorError) {
    match e {
        PriceMonitorError::Validation(message) => {
            warn!(context, "{message}");
            ui.toast(ToastLevel::Warning, message);
        }
        PriceMonitorError::Cancelled(_) => debug!(context, "cancelled"),
        other => {
            error!(context, error = %other);
            ui.toast(ToastLevel::Danger, &format!("{context}: {}", user_message(other)));
        }
    }
}

/// The server's own text for HTTP failures, the error's display otherwise.
fn user_message(e: &PriceMonitorError) -> String {
    match e {
        PriceMonitorError::Status { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn fetch_stats(sdk: &PriceMonitorSdk, ws: i64) -> Result<DashboardStats> {
    Ok(DashboardStats {
        listings: sdk.listings().list_for_workspace(ws)?.len(),
        seasons: sdk.seasons().list(ws)?.len(),
    })
}

/// Re-fetch and re-render seasons, listings and stats for `ws`.
fn refresh_views(sdk: &PriceMonitorSdk, ui: &dyn Ui, ws: i64) {
    info!(workspace_id = ws, "refreshing views after scrape job");
    let refreshed = (|| -> Result<()> {
        let seasons = sdk.seasons().list(ws)?;
        ui.show_seasons(&seasons);
        let listings = sdk.listings().list_for_workspace(ws)?;
        ui.show_listings(&listings);
        ui.show_stats(&DashboardStats {
            listings: listings.len(),
            seasons: seasons.len(),
        });
        Ok(())
    })();
    if let Err(e) = refreshed {
        notify(ui, "Failed to refresh", &e);
    }
}
