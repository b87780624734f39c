//! Error types for the review client

use std::error::Error as StdError;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when querying the review status API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be completed (DNS, connection, timeout)
    #[error("{}", describe_transport(.0))]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status code
    #[error("Status API returned HTTP {status}")]
    Http {
        /// HTTP status code
        status: u16,
    },

    /// The body is not valid JSON
    #[error("Failed to decode status API response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Create an HTTP error from a status code
    pub fn http(status: u16) -> Self {
        Self::Http { status }
    }

    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http { status } if *status >= 500)
    }
}

/// Names the cause of a transport failure, without the request URL
fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "Request to the status API timed out".to_string();
    }

    let cause = root_cause(err);
    if err.is_connect() {
        format!("Could not connect to the status API: {}", cause)
    } else {
        format!("Request to the status API failed: {}", cause)
    }
}

fn root_cause(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
