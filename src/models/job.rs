use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// JobId: opaque scrape job identifier
// ---------------------------------------------------------------------------

/// Backend job identifier. The backend may send it as a number or a string;
/// both are kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the job id from a scrape response, checking `id`, `job_id`,
    /// then `jobId`. Nulls, empty strings and non-scalar values are skipped.
    pub fn from_response(body: &Value) -> Option<Self> {
        ["id", "job_id", "jobId"]
            .iter()
            .filter_map(|key| body.get(*key))
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(JobId(s.clone())),
                Value::Number(n) => Some(JobId(n.to_string())),
                _ => None,
            })
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

impl From<i64> for JobId {
    fn from(n: i64) -> Self {
        JobId(n.to_string())
    }
}

// ---------------------------------------------------------------------------
// ScrapeRequest: body for POST /api/seasons/{id}/scrape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeParams {
    pub guests: u32,
    pub currency: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest {
    /// Listing ids to scrape.
    pub establishments: Vec<i64>,
    pub platform: String,
    pub params: ScrapeParams,
}
