//! Homework Bot
//!
//! A long-lived poller that watches the review status of the latest homework
//! and reports every change to a Telegram chat.
//!
//! Architecture:
//! - Configuration: credentials and intervals from the environment (and `.env`)
//! - Repositories: the review status API and the Telegram notifier
//! - Scheduler: the poll loop with its message and error deduplication
//!
//! Missing credentials stop the process before any request is made; every
//! failure after startup is reported and retried on the next tick.

mod config;
mod error;
mod logging;
mod repository;
mod scheduler;

use anyhow::{Context, Result};
use homework_client::ReviewClient;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::repository::{HttpStatusRepository, Notifier, StatusRepository, TelegramNotifier};
use crate::scheduler::StatusPoller;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    // Logging needs the config for its file sink, so load first and report after
    let config = load_config();
    let _log_guard = logging::init(config.as_ref().ok().and_then(|c| c.log_dir.as_deref()));

    if let Err(e) = &dotenv {
        debug!("No .env file loaded: {}", e);
    }

    let config = config.inspect_err(|e| {
        error!("CRITICAL: required configuration is missing: {:#}", e);
    })?;

    info!("Starting homework bot");
    info!(
        "Loaded configuration: endpoint={}, recipient={:?}, poll_interval={:?}",
        config.endpoint, config.recipient, config.poll_interval
    );

    let client = ReviewClient::with_timeout(
        config.endpoint.clone(),
        config.practicum_token.clone(),
        config.request_timeout,
    )
    .context("Failed to build HTTP client")?;

    let statuses: Arc<dyn StatusRepository> = Arc::new(HttpStatusRepository::new(client));
    let notifier: Arc<dyn Notifier> =
        Arc::new(TelegramNotifier::new(&config.telegram_token, config.recipient.clone()));

    let poller = StatusPoller::new(statuses, notifier, config.poll_interval, config.from_date);

    poller.run().await;

    Ok(())
}

/// Loads and validates configuration from the environment
fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
