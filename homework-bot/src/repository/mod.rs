//! Repository layer
//!
//! Repositories wrap the two external services the bot talks to: the review
//! status API and Telegram. They expose narrow trait interfaces so the poller
//! can be driven by substitutes in tests.

mod statuses;
mod telegram;

// Re-export traits
pub use statuses::StatusRepository;
pub use telegram::Notifier;

// Re-export implementations
pub use statuses::HttpStatusRepository;
pub use telegram::TelegramNotifier;

#[cfg(test)]
pub use telegram::NotifyError;
