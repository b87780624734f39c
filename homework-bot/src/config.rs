//! Bot configuration
//!
//! Defines all configurable parameters for the bot: credentials for the
//! review API and the Telegram bot, the destination chat, and polling
//! intervals.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use homework_client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use teloxide::types::{ChatId, Recipient};

/// Default pause between two poll iterations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(600);

/// Bot configuration
#[derive(Clone)]
pub struct Config {
    /// OAuth token for the review status API
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives every notification
    pub recipient: Recipient,

    /// Status endpoint URL
    pub endpoint: String,

    /// Pause between iterations, identical after success and failure
    pub poll_interval: Duration,

    /// Timeout for a single status request
    pub request_timeout: Duration,

    /// Initial lower bound of the query window (Unix timestamp)
    pub from_date: i64,

    /// Directory for the rolling log file, if file logging is wanted
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - PRACTICUM_TOKEN or TOKEN (required)
    /// - TELEGRAM_TOKEN (required)
    /// - TELEGRAM_CHAT_ID (required, numeric id or @channelusername)
    /// - PRACTICUM_ENDPOINT (optional)
    /// - POLL_INTERVAL (optional, seconds, default: 600)
    /// - REQUEST_TIMEOUT (optional, seconds, default: 30)
    /// - FROM_DATE (optional, Unix timestamp, default: now)
    /// - LOG_DIR (optional)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Creates configuration using `lookup` to resolve variable names
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let practicum_token = non_empty("PRACTICUM_TOKEN")
            .or_else(|| non_empty("TOKEN"))
            .context("PRACTICUM_TOKEN environment variable not set")?;

        let telegram_token =
            non_empty("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN environment variable not set")?;

        let recipient = non_empty("TELEGRAM_CHAT_ID")
            .context("TELEGRAM_CHAT_ID environment variable not set")
            .and_then(|raw| parse_recipient(&raw))?;

        let endpoint = non_empty("PRACTICUM_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let poll_interval = non_empty("POLL_INTERVAL")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let request_timeout = non_empty("REQUEST_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let from_date = non_empty("FROM_DATE")
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let log_dir = non_empty("LOG_DIR").map(PathBuf::from);

        Ok(Self {
            practicum_token,
            telegram_token,
            recipient,
            endpoint,
            poll_interval,
            request_timeout,
            from_date,
            log_dir,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.practicum_token.is_empty() {
            bail!("practicum_token cannot be empty");
        }

        if self.telegram_token.is_empty() {
            bail!("telegram_token cannot be empty");
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            bail!("endpoint must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

// Tokens stay out of logs and panic messages.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &"***")
            .field("telegram_token", &"***")
            .field("recipient", &self.recipient)
            .field("endpoint", &self.endpoint)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("from_date", &self.from_date)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

/// Parses a chat id: a numeric id or a public `@channelusername`
fn parse_recipient(raw: &str) -> anyhow::Result<Recipient> {
    let raw = raw.trim();

    if let Ok(id) = raw.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }

    match raw.strip_prefix('@') {
        Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => {
            Ok(Recipient::ChannelUsername(raw.to_string()))
        }
        _ => bail!(
            "TELEGRAM_CHAT_ID must be a numeric id or an @channelusername, got {:?}",
            raw
        ),
    }
}
