//! Homework Core
//!
//! Core types and pure logic for the homework review bot.
//!
//! This crate contains:
//! - Domain types: the status payload, work items and the verdict table
//! - Errors: tagged validation failures shared by the client and the bot

pub mod domain;
pub mod error;

pub use error::{PayloadError, Result};
