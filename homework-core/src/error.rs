//! Validation errors for status payloads

use thiserror::Error;

/// Result type alias for payload operations
pub type Result<T> = std::result::Result<T, PayloadError>;

/// Ways a decoded status payload can fail to produce a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The payload or one of its parts has the wrong JSON type
    #[error("Unexpected response shape: {0}")]
    Shape(String),

    /// A required key is absent
    #[error("Response is missing key `{0}`")]
    MissingKey(&'static str),

    /// The `homeworks` list holds no items
    #[error("Homework list is empty")]
    EmptyList,

    /// The status code has no entry in the verdict table
    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),
}

impl PayloadError {
    /// Check if this error only means there is nothing new to report
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Self::EmptyList)
    }
}
