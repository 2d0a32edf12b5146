//! Price Monitor SDK for Rust.
//!
//! Client-side controller for the Price Monitor backend: workspace, season
//! and listing management, bulk scrape submission with live job progress
//! over WebSocket, multi-listing price analytics with CSV export, and a
//! paginated raw-data browser.
//!
//! # Quick start
//!
//! ```no_run
//! use price_monitor_sdk::PriceMonitorSdk;
//! use price_monitor_sdk::models::DateRange;
//!
//! let sdk = PriceMonitorSdk::builder()
//!     .base_url("http://127.0.0.1:8000")
//!     .build()
//!     .unwrap();
//!
//! let workspaces = sdk.workspaces().list().unwrap();
//!
//! let range = DateRange::parse("2025-01-01", "2025-01-31").unwrap();
//! let prices = sdk.prices().history(7, &range, None).unwrap();
//! ```

pub mod analytics;
#[cfg(feature = "async")]
pub mod async_client;
pub mod browser;
pub mod config;
pub mod connection;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod models;
pub mod monitor;
pub mod queries;
pub mod query_builder;
pub mod state;
pub mod ui;

#[cfg(feature = "async")]
pub use async_client::AsyncPriceMonitorSdk;
pub use browser::DatabaseBrowser;
pub use connection::Connection;
pub use dashboard::Dashboard;
pub use error::{PriceMonitorError, Result};
pub use export::ExportWriter;
pub use monitor::JobMonitor;
pub use query_builder::QueryBuilder;
pub use ui::{LogUi, ToastLevel, Ui};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// PriceMonitorSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PriceMonitorSdk`] instance.
///
/// Use [`PriceMonitorSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](PriceMonitorSdkBuilder::build) to create the SDK.
pub struct PriceMonitorSdkBuilder {
    base_url: Option<String>,
    timeout: Duration,
    refresh_delay: Duration,
    export_dir: Option<PathBuf>,
}

impl Default for PriceMonitorSdkBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
            refresh_delay: config::REFRESH_DELAY,
            export_dir: None,
        }
    }
}

impl PriceMonitorSdkBuilder {
    /// Set the backend base URL.
    ///
    /// If not set, `PRICE_MONITOR_URL` is read from the environment, falling
    /// back to `http://127.0.0.1:8000`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay between a successful scrape job and the refresh of seasons,
    /// listings and stats. Defaults to 1.5 seconds.
    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Directory receiving exported CSV files.
    ///
    /// If not set, the platform download directory is used.
    pub fn export_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.export_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the SDK. No request is made until the first query.
    pub fn build(self) -> Result<PriceMonitorSdk> {
        let base_url = self.base_url.unwrap_or_else(config::default_base_url);
        let conn = Connection::new(&base_url, self.timeout)?;
        tracing::debug!(base_url = %conn.base_url(), "price monitor sdk ready");
        Ok(PriceMonitorSdk {
            conn,
            refresh_delay: self.refresh_delay,
            export_dir: self.export_dir,
        })
    }
}

// ---------------------------------------------------------------------------
// PriceMonitorSdk
// ---------------------------------------------------------------------------

/// The main entry point for the Price Monitor SDK.
///
/// Wraps a [`Connection`] and exposes one query interface per backend
/// resource as lightweight borrowing wrappers. Cloning is cheap and shares
/// the HTTP connection pool.
///
/// Created via [`PriceMonitorSdk::builder()`].
#[derive(Clone)]
pub struct PriceMonitorSdk {
    conn: Connection,
    refresh_delay: Duration,
    export_dir: Option<PathBuf>,
}

impl PriceMonitorSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> PriceMonitorSdkBuilder {
        PriceMonitorSdkBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the workspace query interface.
    pub fn workspaces(&self) -> queries::WorkspaceQuery<'_> {
        queries::WorkspaceQuery::new(&self.conn)
    }

    /// Access the season query interface.
    pub fn seasons(&self) -> queries::SeasonQuery<'_> {
        queries::SeasonQuery::new(&self.conn)
    }

    /// Access the listing query interface.
    pub fn listings(&self) -> queries::ListingQuery<'_> {
        queries::ListingQuery::new(&self.conn)
    }

    /// Access the price history interface.
    pub fn prices(&self) -> queries::PriceQuery<'_> {
        queries::PriceQuery::new(&self.conn)
    }

    /// Access scrape job submission.
    pub fn scrape(&self) -> queries::ScrapeQuery<'_> {
        queries::ScrapeQuery::new(&self.conn)
    }

    /// Access the raw table interface used by the database browser.
    pub fn database(&self) -> queries::DatabaseQuery<'_> {
        queries::DatabaseQuery::new(&self.conn)
    }

    /// Access the analytics interface (price batches, reports, CSV).
    pub fn analytics(&self) -> queries::AnalyticsQuery<'_> {
        queries::AnalyticsQuery::new(&self.conn)
    }

    // -- Monitoring and export ---------------------------------------------

    /// Create a scrape-job monitor reporting to `ui`.
    pub fn monitor(&self, ui: Arc<dyn Ui>) -> JobMonitor {
        JobMonitor::new(self.conn.clone(), ui, self.refresh_delay)
    }

    /// Writer for the configured export directory, created if missing.
    pub fn exporter(&self) -> Result<ExportWriter> {
        ExportWriter::new(self.export_dir.clone())
    }

    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for PriceMonitorSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let export_dir = self
            .export_dir
            .clone()
            .unwrap_or_else(config::default_export_dir);
        write!(
            f,
            "PriceMonitorSdk(base_url={}, export_dir={}, refresh_delay={:?})",
            self.conn.base_url(),
            export_dir.display(),
            self.refresh_delay
        )
    }
}
