//! Google Calendar configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// OAuth 2.0 client credentials from the Google Cloud Console.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
}

/// Shape of a Google credentials JSON file.
///
/// Two formats are accepted: the Cloud Console download with an `installed`
/// or `web` section, and a flat file with `client_id`/`client_secret` at the
/// root (as written by gcloud and similar tools).
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates credentials from an id and secret.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("failed to read credentials file: {}", e))?;
        Self::from_json(&content)
    }

    /// Parses credentials from a Google credentials JSON string.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| format!("failed to parse credentials JSON: {}", e))?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err("credentials file must contain an 'installed'/'web' section or \
             'client_id'/'client_secret' at the root"
            .to_string())
    }

    /// Checks that the credentials look plausible before starting a flow.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the Google Calendar service.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client credentials.
    pub credentials: OAuthCredentials,

    /// The calendar written to and read from. Defaults to `"primary"`.
    pub calendar_id: String,

    /// Where OAuth tokens are persisted.
    pub token_path: PathBuf,

    /// Request timeout for all HTTP calls.
    pub timeout: Duration,

    /// Port range tried for the loopback OAuth listener.
    pub loopback_port_range: (u16, u16),

    /// OAuth scopes to request. Event insertion needs read-write access.
    pub scopes: Vec<String>,
}

impl GoogleConfig {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default OAuth scope. Creating events requires the full calendar
    /// scope, not the read-only one.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar";

    /// Creates a configuration with defaults for everything but credentials.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            calendar_id: "primary".to_string(),
            token_path: Self::default_token_path(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            loopback_port_range: (8080, 8090),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
        }
    }

    /// Returns the default token storage path.
    pub fn default_token_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".local").join("share"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("breakout")
            .join("google-tokens.json")
    }

    /// Sets the calendar to operate on.
    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    /// Sets the token storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the loopback port range for the OAuth listener.
    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.calendar_id.is_empty() {
            return Err("calendar_id must not be empty".to_string());
        }

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err("invalid loopback port range".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> OAuthCredentials {
        OAuthCredentials::new("test-client.apps.googleusercontent.com", "test-secret")
    }

    #[test]
    fn credentials_validation() {
        assert!(test_credentials().validate().is_ok());
        assert!(OAuthCredentials::new("", "secret").validate().is_err());
        assert!(OAuthCredentials::new("bad-id", "secret").validate().is_err());
        assert!(OAuthCredentials::new("x.apps.googleusercontent.com", "")
            .validate()
            .is_err());
    }

    #[test]
    fn config_defaults() {
        let config = GoogleConfig::new(test_credentials());
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.scopes, vec![GoogleConfig::DEFAULT_SCOPE.to_string()]);
        assert_eq!(
            config.timeout,
            Duration::from_secs(GoogleConfig::DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn default_scope_allows_writes() {
        assert!(!GoogleConfig::DEFAULT_SCOPE.ends_with(".readonly"));
    }

    #[test]
    fn config_builder_methods() {
        let config = GoogleConfig::new(test_credentials())
            .with_calendar_id("team@example.com")
            .with_token_path("/tmp/tokens.json")
            .with_timeout(Duration::from_secs(60))
            .with_loopback_port_range(9000, 9010);

        assert_eq!(config.calendar_id, "team@example.com");
        assert_eq!(config.token_path, PathBuf::from("/tmp/tokens.json"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.loopback_port_range, (9000, 9010));
    }

    #[test]
    fn config_validation() {
        assert!(GoogleConfig::new(test_credentials()).validate().is_ok());

        let mut bad = GoogleConfig::new(test_credentials());
        bad.scopes.clear();
        assert!(bad.validate().is_err());

        let mut bad = GoogleConfig::new(test_credentials());
        bad.calendar_id.clear();
        assert!(bad.validate().is_err());

        let bad = GoogleConfig::new(test_credentials()).with_loopback_port_range(9010, 9000);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn credentials_from_json_installed() {
        let json = r#"{
            "installed": {
                "client_id": "test-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "project_id": "my-project"
            }
        }"#;
        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn credentials_from_json_web() {
        let json = r#"{
            "web": {
                "client_id": "web-id.apps.googleusercontent.com",
                "client_secret": "web-secret"
            }
        }"#;
        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id.apps.googleusercontent.com");
    }

    #[test]
    fn credentials_from_json_flat() {
        let json = r#"{
            "client_id": "flat-id.apps.googleusercontent.com",
            "client_secret": "flat-secret",
            "refresh_token": "some-refresh-token"
        }"#;
        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "flat-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "flat-secret");
    }

    #[test]
    fn credentials_from_json_invalid() {
        assert!(OAuthCredentials::from_json(r#"{ "other": {} }"#).is_err());
        assert!(OAuthCredentials::from_json("not json").is_err());
    }
}
