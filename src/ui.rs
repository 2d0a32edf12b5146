//! Presentation seam.
//!
//! The SDK never renders anything itself. Handlers push toasts, log lines,
//! progress and freshly fetched data through [`Ui`]; a terminal front end, a
//! web view or a test recorder implements it.

use tracing::{error, info, warn};

use crate::analytics::{PriceChart, StatsTable};
use crate::dashboard::DashboardStats;
use crate::models::{Listing, Page, Season, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Primary,
    Success,
    Warning,
    Danger,
}

/// Everything the dashboard needs from a front end.
///
/// Implementations are shared with the scrape-job monitor thread, hence
/// `Send + Sync`. Only `toast` and `confirm` are required.
pub trait Ui: Send + Sync {
    fn toast(&self, level: ToastLevel, message: &str);

    /// Ask the user to confirm a destructive action.
    fn confirm(&self, message: &str) -> bool;

    fn append_scrape_log(&self, _line: &str) {}

    /// Set the scrape progress bar; `percent` is already clamped to `0..=100`.
    fn set_scrape_progress(&self, _percent: f64) {}

    fn show_workspaces(&self, _workspaces: &[Workspace]) {}
    fn show_seasons(&self, _seasons: &[Season]) {}
    fn show_listings(&self, _listings: &[Listing]) {}
    fn show_stats(&self, _stats: &DashboardStats) {}
    fn show_chart(&self, _chart: &PriceChart) {}
    fn show_price_stats(&self, _stats: &StatsTable) {}
    fn show_table(&self, _columns: &[String], _page: &Page) {}
}

/// [`Ui`] that writes everything to `tracing`.
///
/// Confirmations are answered with the fixed `assume_yes` value, which makes
/// it suitable for scripted use.
#[derive(Debug, Clone, Default)]
pub struct LogUi {
    pub assume_yes: bool,
}

impl LogUi {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Ui for LogUi {
    fn toast(&self, level: ToastLevel, message: &str) {
        match level {
            ToastLevel::Primary | ToastLevel::Success => info!(toast = ?level, "{message}"),
            ToastLevel::Warning => warn!("{message}"),
            ToastLevel::Danger => error!("{message}"),
        }
    }

    fn confirm(&self, message: &str) -> bool {
        info!(confirmed = self.assume_yes, "{message}");
        self.assume_yes
    }

    fn append_scrape_log(&self, line: &str) {
        info!(target: "price_monitor_sdk::scrape", "{line}");
    }

    fn set_scrape_progress(&self, percent: f64) {
        info!(target: "price_monitor_sdk::scrape", percent, "progress");
    }
}
