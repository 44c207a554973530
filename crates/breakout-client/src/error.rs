//! Client error types.

use std::fmt;

use breakout_core::GroupingError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Calendar access error.
    Provider(String),
    /// Rejected command-line or partition parameters.
    InvalidArgument(String),
    /// IO error (audit logs, config files).
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "calendar error: {}", msg),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<breakout_providers::ProviderError> for ClientError {
    fn from(err: breakout_providers::ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}

impl From<GroupingError> for ClientError {
    fn from(err: GroupingError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
