//! breakout CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use breakout_client::cli::{Cli, Command, ConfigAction};
use breakout_client::config::ClientConfig;
use breakout_client::error::{ClientError, ClientResult};
use breakout_client::commands;
use breakout_core::tracing::{init_tracing, TracingConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().unwrap_or_default()
    };

    match cli.command {
        Command::Auth {
            client_id,
            client_secret,
            credentials_file,
            force,
        } => commands::auth::run(client_id, client_secret, credentials_file, force, &config).await,
        Command::ListEvents { date_min, limit } => {
            commands::list::run(date_min, limit, &config).await
        }
        Command::CreateGroups {
            date_min,
            limit,
            group_size,
            seed,
        } => commands::groups::run(date_min, limit, group_size, seed, &config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
