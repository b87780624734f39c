//! Homework Review HTTP Client
//!
//! A small, type-safe client for the homework review status API.
//!
//! The client performs exactly one request per call and never retries; the
//! caller decides when to try again.
//!
//! # Example
//!
//! ```no_run
//! use homework_client::ReviewClient;
//!
//! # async fn example() -> homework_client::Result<()> {
//! let client = ReviewClient::new(
//!     "https://practicum.yandex.ru/api/user_api/homework_statuses/",
//!     "token",
//! )?;
//!
//! let payload = client.fetch(0).await?;
//! println!("Server time: {:?}", payload.current_date());
//! # Ok(())
//! # }
//! ```

pub mod error;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use homework_core::domain::homework::StatusPayload;

use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use tracing::debug;

/// Default endpoint of the homework status API
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default timeout applied to every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the homework review status API
#[derive(Debug, Clone)]
pub struct ReviewClient {
    /// Full URL of the status endpoint
    endpoint: String,
    /// OAuth token sent in the `Authorization` header
    token: String,
    /// HTTP client instance
    client: Client,
}

impl ReviewClient {
    /// Create a new client with [`DEFAULT_TIMEOUT`]
    ///
    /// # Arguments
    /// * `endpoint` - URL of the status endpoint
    /// * `token` - OAuth token for the API
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, token, DEFAULT_TIMEOUT)
    }

    /// Create a new client whose requests give up after `timeout`
    pub fn with_timeout(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(endpoint, token, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(endpoint: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        }
    }

    /// Get the endpoint this client queries
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch homework statuses changed since `from_date`
    ///
    /// # Arguments
    /// * `from_date` - Unix timestamp, lower bound of the query window
    ///
    /// # Errors
    /// * [`ClientError::Transport`] if the request cannot be completed
    /// * [`ClientError::Http`] if the status code is not 200
    /// * [`ClientError::Decode`] if the body is not JSON
    pub async fn fetch(&self, from_date: i64) -> Result<StatusPayload> {
        debug!(from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(header::AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Check the status code and decode the body as JSON
    async fn handle_response(&self, response: reqwest::Response) -> Result<StatusPayload> {
        let status = response.status();

        if status != StatusCode::OK {
            return Err(ClientError::http(status.as_u16()));
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("invalid JSON: {}", e)))?;

        Ok(StatusPayload::new(value))
    }
}
