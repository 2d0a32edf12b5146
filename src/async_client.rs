//! Async wrapper around [`PriceMonitorSdk`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free. The
//! blocking HTTP client must never be created or dropped on a runtime
//! thread, so construction and teardown go through the pool as well.
//!
//! # Example
//!
//! ```no_run
//! use price_monitor_sdk::AsyncPriceMonitorSdk;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = AsyncPriceMonitorSdk::builder().build().await.unwrap();
//!
//!     // Run any sync SDK method via closure
//!     let workspaces = sdk.run(|s| s.workspaces().list()).await.unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::analytics::AnalyticsReport;
use crate::config;
use crate::error::{PriceMonitorError, Result};
use crate::models::{DateRange, Listing, PriceSample};
use crate::state::Selection;
use crate::PriceMonitorSdk;

// ---------------------------------------------------------------------------
// AsyncPriceMonitorSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncPriceMonitorSdk`] instance.
pub struct AsyncPriceMonitorSdkBuilder {
    base_url: Option<String>,
    timeout: Duration,
    refresh_delay: Duration,
    export_dir: Option<PathBuf>,
}

impl Default for AsyncPriceMonitorSdkBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
            refresh_delay: config::REFRESH_DELAY,
            export_dir: None,
        }
    }
}

impl AsyncPriceMonitorSdkBuilder {
    /// Set the backend base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before the post-job refresh.
    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Directory receiving exported CSV files.
    pub fn export_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.export_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the async SDK on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncPriceMonitorSdk> {
        tokio::task::spawn_blocking(move || {
            let mut builder = PriceMonitorSdk::builder()
                .timeout(self.timeout)
                .refresh_delay(self.refresh_delay);
            if let Some(url) = self.base_url {
                builder = builder.base_url(url);
            }
            if let Some(dir) = self.export_dir {
                builder = builder.export_dir(dir);
            }
            let sdk = builder.build()?;
            Ok(AsyncPriceMonitorSdk {
                inner: Arc::new(sdk),
            })
        })
        .await
        .map_err(join_error)?
    }
}

// ---------------------------------------------------------------------------
// AsyncPriceMonitorSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`PriceMonitorSdk`].
///
/// All operations are dispatched to a blocking thread pool via
/// [`tokio::task::spawn_blocking`]. The SDK is `Sync`, so concurrent calls
/// share it without locking.
///
/// # Usage
///
/// Use [`run()`](Self::run) to execute any sync SDK method:
///
/// ```no_run
/// # use price_monitor_sdk::AsyncPriceMonitorSdk;
/// # async fn example() -> price_monitor_sdk::Result<()> {
/// let sdk = AsyncPriceMonitorSdk::builder().build().await?;
/// let listings = sdk.run(|s| s.listings().list()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AsyncPriceMonitorSdk {
    inner: Arc<PriceMonitorSdk>,
}

impl AsyncPriceMonitorSdk {
    /// Create a new builder for configuring the async SDK.
    pub fn builder() -> AsyncPriceMonitorSdkBuilder {
        AsyncPriceMonitorSdkBuilder::default()
    }

    /// Run a sync SDK operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PriceMonitorSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&sdk))
            .await
            .map_err(join_error)?
    }

    /// Price history for one listing.
    pub async fn price_history(
        &self,
        listing_id: i64,
        range: DateRange,
        provider: Option<String>,
    ) -> Result<Vec<PriceSample>> {
        self.run(move |s| s.prices().history(listing_id, &range, provider.as_deref()))
            .await
    }

    /// Chart and statistics for `selection`.
    pub async fn analytics_report(
        &self,
        selection: Selection,
        listings: Vec<Listing>,
        range: DateRange,
        provider: Option<String>,
    ) -> Result<AnalyticsReport> {
        self.run(move |s| {
            s.analytics()
                .report(&selection, &listings, &range, provider.as_deref())
        })
        .await
    }

    /// CSV text for `selection`.
    pub async fn analytics_csv(
        &self,
        selection: Selection,
        listings: Vec<Listing>,
        range: DateRange,
        provider: Option<String>,
    ) -> Result<String> {
        self.run(move |s| {
            s.analytics()
                .export_csv(&selection, &listings, &range, provider.as_deref())
        })
        .await
    }

    /// Release this handle on the blocking pool.
    ///
    /// Other clones keep the SDK alive; the last one drops the HTTP client.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            drop(self.inner);
            Ok(())
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(e: tokio::task::JoinError) -> PriceMonitorError {
    PriceMonitorError::InvalidArgument(format!("Task join error: {e}"))
}
