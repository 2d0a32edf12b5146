use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const BASE_URL_ENV: &str = "PRICE_MONITOR_URL";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between a successful scrape job and the re-fetch of dependent views.
pub const REFRESH_DELAY: Duration = Duration::from_millis(1500);

pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Maximum number of page links shown around the current database page.
pub const PAGE_WINDOW: u32 = 5;

pub const DEFAULT_GUESTS: u32 = 2;
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_PLATFORM: &str = "airbnb";

/// Default analytics window, in days, ending today.
pub const ANALYTICS_DEFAULT_DAYS: i64 = 30;

pub const PROVIDERS: [&str; 3] = ["airbnb", "booking", "expedia"];

/// Provider filter value meaning "every provider".
pub const ALL_PROVIDERS: &str = "all";

pub const SERIES_COLORS: [&str; 10] = [
    "#3ecf8e", // green
    "#667eea", // purple
    "#f56565", // red
    "#ed8936", // orange
    "#48bb78", // darker green
    "#4299e1", // blue
    "#9f7aea", // violet
    "#ed64a6", // pink
    "#38b2ac", // teal
    "#ecc94b", // yellow
];

pub fn workspaces_path() -> String {
    "/api/workspaces".to_string()
}

pub fn workspace_path(id: i64) -> String {
    format!("/api/workspaces/{id}")
}

pub fn workspace_seasons_path(workspace_id: i64) -> String {
    format!("/api/workspaces/{workspace_id}/seasons")
}

pub fn season_path(id: i64) -> String {
    format!("/api/seasons/{id}")
}

pub fn season_scrape_path(season_id: i64) -> String {
    format!("/api/seasons/{season_id}/scrape")
}

pub fn listings_path() -> String {
    "/api/listings".to_string()
}

pub fn listing_path(id: i64) -> String {
    format!("/api/listings/{id}")
}

pub fn prices_path(listing_id: i64) -> String {
    format!("/api/prices/{listing_id}")
}

pub fn scrape_job_socket_path(job_id: &str) -> String {
    format!("/ws/scrape-jobs/{job_id}")
}

/// Resolve the backend base URL: `PRICE_MONITOR_URL` if set, else the local default.
pub fn default_base_url() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
