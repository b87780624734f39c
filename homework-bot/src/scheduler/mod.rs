//! Scheduler layer for the bot
//!
//! This layer owns the polling loop: it asks the review API for updates on a
//! fixed interval and decides which results are worth a notification.

pub mod poller;

pub use poller::StatusPoller;
