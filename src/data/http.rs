//! Network-fetch primitive shared by every provider
//!
//! Issues an HTTP GET bounded by a fixed timeout, treats non-success statuses
//! as failures carrying the status code, and decodes the body as JSON.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Default timeout applied to every outbound request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching provider data
///
/// The type is `Clone` so a single failed fetch can be handed to every caller
/// that was coalesced onto it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The request exceeded its deadline and was aborted
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// A response arrived with a non-success status
    #[error("HTTP Error: {0}")]
    Status(u16),

    /// The request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Failed to parse the response body
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Any other failure raised while producing a value, such as a request
    /// URL that cannot be built from the configuration
    #[error("{0}")]
    Producer(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Thin wrapper around a reqwest client that enforces the fetch contract
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpFetcher {
    /// Creates a fetcher with the given per-request timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Fetches `url` and decodes the JSON body into `T`
    ///
    /// # Arguments
    /// * `url` - Fully built request URL
    /// * `headers` - Extra request headers (e.g. an authorization header)
    ///
    /// # Returns
    /// * `Ok(T)` - The decoded body
    /// * `Err(FetchError::Timeout)` - No complete response within the timeout
    /// * `Err(FetchError::Status)` - The server answered with a non-2xx status
    /// * `Err(FetchError::Request | FetchError::Parse)` - Transport or decoding failure
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            Ok::<String, FetchError>(response.text().await?)
        };

        let text = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        Ok(serde_json::from_str(&text)?)
    }
}
