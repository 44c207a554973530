//! Tracing setup shared by the breakout binaries.
//!
//! User-facing output goes to stdout with `println!`; everything else goes
//! through `tracing` and is filtered here. `RUST_LOG` overrides the default
//! level.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    /// The global subscriber was already set.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// The default log level when `RUST_LOG` is not set.
    pub default_level: Level,
    /// Whether to include the module path in log lines.
    pub include_target: bool,
    /// Whether to include timestamps.
    pub include_timestamp: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            include_target: false,
            include_timestamp: false,
        }
    }
}

impl TracingConfig {
    /// Config for `--debug` runs.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_target: true,
            include_timestamp: true,
        }
    }

    /// Sets the default log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }
}

/// Initializes the global tracing subscriber. Call once at startup.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.include_target)
        .compact();

    if config.include_timestamp {
        tracing::subscriber::set_global_default(builder.finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.without_time().finish())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_quiet() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, Level::WARN);
        assert!(!config.include_target);
        assert!(!config.include_timestamp);
    }

    #[test]
    fn debug_config_is_verbose() {
        let config = TracingConfig::debug();
        assert_eq!(config.default_level, Level::DEBUG);
        assert!(config.include_target);
    }

    #[test]
    fn with_level_overrides_default() {
        let config = TracingConfig::default().with_level(Level::INFO);
        assert_eq!(config.default_level, Level::INFO);
    }
}
