//! Telegram notifier
//!
//! Delivers text messages to the one configured chat.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use thiserror::Error;
use tracing::debug;

/// Error raised when a notification could not be delivered
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Sends text to a fixed destination
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text`, without retrying on failure
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

/// Notifier backed by a Telegram bot
pub struct TelegramNotifier {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramNotifier {
    /// Creates a notifier for `recipient` using the bot identified by `token`
    pub fn new(token: &str, recipient: Recipient) -> Self {
        Self {
            bot: Bot::new(token),
            recipient,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        self.bot
            .send_message(self.recipient.clone(), text.to_string())
            .await?;
        debug!(recipient = ?self.recipient, "Message delivered");
        Ok(())
    }
}
