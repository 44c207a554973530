//! The `config` command.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Prints the current configuration as TOML.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to render config: {}", e)))?;
    print!("{}", rendered);
    Ok(())
}

/// Validates the configuration, including credential resolution.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    match config.google {
        Some(ref google) => {
            let provider_config = google
                .to_provider_config()
                .map_err(ClientError::Config)?;
            provider_config.validate().map_err(ClientError::Config)?;
            println!("Configuration is valid.");
        }
        None => {
            println!("Configuration is valid (no [google] section yet; run `breakout auth`).");
        }
    }

    if config.groups.group_size == 0 {
        return Err(ClientError::Config(
            "[groups] group_size must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Prints the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("{}", ClientConfig::default_path().display());
    Ok(())
}
