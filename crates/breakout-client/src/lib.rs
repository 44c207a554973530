//! The `breakout` command-line interface.
//!
//! Fetches upcoming calendar events matching a text filter, partitions each
//! event's accepted attendees into shuffled groups, and creates one
//! conference-enabled calendar event per group.

pub mod audit;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
