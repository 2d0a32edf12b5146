use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;

// ---------------------------------------------------------------------------
// PlatformSource: one platform a listing can be scraped from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSource {
    pub platform: String,
    #[serde(default)]
    pub extra_data: Option<Value>,
}

impl PlatformSource {
    /// A source is supported unless `extra_data.supported` is explicitly `false`.
    pub fn is_supported(&self) -> bool {
        self.extra_data
            .as_ref()
            .and_then(|d| d.get("supported"))
            .and_then(Value::as_bool)
            != Some(false)
    }
}

// ---------------------------------------------------------------------------
// Listing: a monitored accommodation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    /// Platform-side identifier (e.g. the Airbnb room id).
    pub listing_id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub workspace_id: Option<i64>,
    #[serde(default)]
    pub platform_sources: Vec<PlatformSource>,
}

fn default_provider() -> String {
    config::DEFAULT_PLATFORM.to_string()
}

impl Listing {
    /// Whether the listing can be scraped on `provider`.
    ///
    /// Listings without platform sources predate multi-platform support and
    /// are treated as Airbnb-only.
    pub fn supports(&self, provider: &str) -> bool {
        if self.platform_sources.is_empty() {
            return provider == config::DEFAULT_PLATFORM;
        }
        self.platform_sources
            .iter()
            .any(|ps| ps.platform == provider && ps.is_supported())
    }

    /// Badge labels for the listings table.
    pub fn provider_badges(&self) -> Vec<String> {
        if self.platform_sources.is_empty() {
            return vec![self.provider.clone()];
        }
        self.platform_sources
            .iter()
            .map(|ps| {
                let label = ps.platform.to_uppercase();
                if ps.is_supported() {
                    label
                } else {
                    format!("{label} (unsupported)")
                }
            })
            .collect()
    }
}

/// Body for `POST /api/listings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewListing {
    pub listing_id: String,
    pub name: String,
    pub url: Option<String>,
    pub provider: String,
    pub workspace_id: Option<i64>,
}
