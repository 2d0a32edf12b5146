//! Blocking HTTP connection to the Price Monitor backend.
//!
//! Every request goes through [`Connection::send`], which turns non-2xx
//! responses into [`PriceMonitorError::Status`] carrying the server's own
//! error text, so call sites never inspect status codes themselves.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{PriceMonitorError, Result};

/// JSON keys checked, in order, for a human-readable error message.
const ERROR_MESSAGE_KEYS: [&str; 3] = ["detail", "message", "error"];

/// HTTP client bound to one backend base URL.
///
/// Cheap to clone: the underlying `reqwest` client is reference counted.
#[derive(Clone)]
pub struct Connection {
    client: Client,
    base_url: Url,
}

impl Connection {
    /// Create a connection for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(PriceMonitorError::InvalidArgument(format!(
                "Unsupported URL scheme '{}' (expected http or https)",
                base_url.scheme()
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an absolute API path (e.g. `/api/listings`) against the base URL,
    /// keeping any path prefix the base URL carries.
    pub fn url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Like [`url`](Self::url), with query parameters appended in order.
    pub fn url_with_query(&self, path: &str, params: &[(String, String)]) -> Result<Url> {
        let mut url = self.url(path)?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    /// WebSocket URL for `path`: `http` becomes `ws`, `https` becomes `wss`.
    pub fn ws_url(&self, path: &str) -> Result<Url> {
        let mut url = self.url(path)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|_| {
            PriceMonitorError::InvalidArgument(format!("Cannot derive WebSocket URL from {url}"))
        })?;
        Ok(url)
    }

    // -- JSON helpers -------------------------------------------------------

    pub fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<T> {
        let url = self.url_with_query(path, params)?;
        Ok(self.send(self.client.get(url))?.json()?)
    }

    pub fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;
        Ok(self.send(self.client.post(url).json(body))?.json()?)
    }

    /// PUT a JSON body, discarding the response payload.
    pub fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path)?;
        self.send(self.client.put(url).json(body))?;
        Ok(())
    }

    /// DELETE a resource, discarding the response payload.
    pub fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        self.send(self.client.delete(url))?;
        Ok(())
    }

    /// DELETE with query parameters and decode the JSON response.
    pub fn delete_json<T: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<T> {
        let url = self.url_with_query(path, params)?;
        Ok(self.send(self.client.delete(url))?.json()?)
    }

    /// GET a raw body (CSV exports and other file downloads).
    pub fn get_bytes(&self, path: &str, params: &[(String, String)]) -> Result<Vec<u8>> {
        let url = self.url_with_query(path, params)?;
        Ok(self.send(self.client.get(url))?.bytes()?.to_vec())
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        debug!(method = %request.method(), url = %request.url(), "backend request");
        let response = self.client.execute(request)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response))
        }
    }
}

/// Build a [`PriceMonitorError::Status`], preferring the server's own message.
fn status_error(response: Response) -> PriceMonitorError {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    let message = server_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    PriceMonitorError::Status {
        status: status.as_u16(),
        message,
    }
}

fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<Value>(trimmed).ok().and_then(|v| {
        ERROR_MESSAGE_KEYS
            .iter()
            .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
    });
    Some(from_json.unwrap_or_else(|| trimmed.to_string()))
}
