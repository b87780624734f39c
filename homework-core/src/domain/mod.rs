//! Core domain types
//!
//! These types describe what the review service reports and how a report is
//! turned into a message for the user. They carry no I/O; fetching lives in
//! the client and delivery in the bot.

pub mod homework;
