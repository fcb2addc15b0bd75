//! HTTP producer for fetch-or-populate
//!
//! Fetches JSON documents from the storefront REST API so they can be cached.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when fetching a JSON document
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Client for fetching JSON over HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HttpFetcher with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new HttpFetcher with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch and parse the JSON document at `url`
    ///
    /// # Returns
    /// * `Ok(Value)` - The parsed body
    /// * `Err(FetchError)` - If the request fails, the status is not 2xx, or the body is not JSON
    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!(url, "fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
