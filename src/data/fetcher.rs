//! open.er-api.com exchange rate API client
//!
//! This module provides functionality to fetch the latest exchange rate table
//! for a single base currency and parse it into our [`RateTable`] structure.

use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::RateTable;

/// Base URL for the open.er-api.com latest-rates endpoint
const ER_API_BASE_URL: &str = "https://open.er-api.com/v6/latest";

/// Errors that can occur when fetching exchange rate data
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection refused, DNS failure, timeout, ...)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered with a non-success status code
    #[error("API returned status {status} for {code}")]
    Status {
        /// Currency code that was requested
        code: String,
        /// HTTP status returned by the API
        status: StatusCode,
    },

    /// Failed to parse the JSON response body
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Client for fetching exchange rate tables from open.er-api.com
#[derive(Debug, Clone)]
pub struct RatesClient {
    client: Client,
    base_url: String,
}

impl Default for RatesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RatesClient {
    /// Create a new RatesClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: ER_API_BASE_URL.to_string(),
        }
    }

    /// Create a new RatesClient pointed at a custom endpoint
    ///
    /// Useful for testing against a local mock server.
    #[allow(dead_code)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the latest rate table for the given base currency code.
    ///
    /// Issues a single blocking-style GET (awaited to completion) against
    /// `{base_url}/{code}`.
    ///
    /// # Returns
    /// * `Ok(RateTable)` - The parsed rate table for the currency
    /// * `Err(FetchError)` - If the request, status check, or parsing fails
    pub async fn fetch_table(&self, code: &str) -> Result<RateTable, FetchError> {
        let url = format!("{}/{}", self.base_url, code);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: code.to_string(),
                status,
            });
        }

        let text = response.text().await?;
        let table: RateTable = serde_json::from_str(&text)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_uses_public_endpoint() {
        let client = RatesClient::new();
        assert_eq!(client.base_url, ER_API_BASE_URL);
    }

    #[test]
    fn test_with_base_url_overrides_endpoint() {
        let client = RatesClient::with_base_url("http://localhost:9999/v6/latest");
        assert_eq!(client.base_url, "http://localhost:9999/v6/latest");
    }

    #[test]
    fn test_fetch_error_status_display_names_currency() {
        let err = FetchError::Status {
            code: "EUR".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        let message = err.to_string();
        assert!(message.contains("EUR"));
        assert!(message.contains("404"));
    }

    #[test]
    fn test_malformed_body_maps_to_parse_error() {
        let parse_err = serde_json::from_str::<RateTable>("not json").unwrap_err();
        let err = FetchError::from(parse_err);
        assert!(matches!(err, FetchError::ParseError(_)));
    }
}
