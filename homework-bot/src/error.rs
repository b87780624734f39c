//! Errors raised inside a single poll iteration

use homework_client::ClientError;
use homework_core::PayloadError;
use thiserror::Error;

/// Prefix of every error notification sent to the user
pub const ERROR_NOTIFICATION_PREFIX: &str = "Сбой в работе программы";

/// Failure of one poll iteration, tagged by the stage that produced it
#[derive(Debug, Error)]
pub enum PollError {
    /// Fetching the status payload failed
    #[error(transparent)]
    Fetch(#[from] ClientError),

    /// The payload could not be turned into a message
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl PollError {
    /// Whether the failure is expected to clear up on its own
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Fetch(e) => matches!(e, ClientError::Transport(_)) || e.is_server_error(),
            Self::Payload(_) => false,
        }
    }

    /// Only means there is no homework to report yet
    pub fn is_nothing_new(&self) -> bool {
        matches!(self, Self::Payload(e) if e.is_empty_list())
    }

    /// Text sent to the user for this failure
    pub fn notification_text(&self) -> String {
        format!("{}: {}", ERROR_NOTIFICATION_PREFIX, self)
    }
}
