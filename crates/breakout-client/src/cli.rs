//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// breakout - Split meeting attendees into breakout-room events
#[derive(Debug, Parser)]
#[command(name = "breakout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "BREAKOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate with Google Calendar
    Auth {
        /// OAuth client ID (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// Path to Google Cloud Console credentials JSON file
        ///
        /// Alternative to providing client_id and client_secret separately.
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,

        /// Force re-authentication even if already authenticated
        #[arg(long, short)]
        force: bool,
    },

    /// List upcoming events matching the configured filter
    ListEvents {
        /// Earliest event start to consider (RFC 3339 or YYYY-MM-DD);
        /// defaults to now
        #[arg(long)]
        date_min: Option<String>,

        /// Maximum number of events to fetch
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Create breakout-group events for each matching upcoming event
    CreateGroups {
        /// Earliest event start to consider (RFC 3339 or YYYY-MM-DD);
        /// defaults to now
        #[arg(long)]
        date_min: Option<String>,

        /// Maximum number of events to fetch
        #[arg(long)]
        limit: Option<usize>,

        /// Target attendees per group
        #[arg(long)]
        group_size: Option<usize>,

        /// Shuffle seed, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
