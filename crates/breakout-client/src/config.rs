//! Client configuration.
//!
//! All settings live in a single `config.toml` at
//! `~/.config/breakout/config.toml` by default.
//!
//! Credential values (`client_id`, `client_secret`) support secret
//! references:
//! - `pass::path/in/store` — resolved via `pass show`
//! - `env::VAR_NAME` — resolved from the environment
//! - plain text — used as-is

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use breakout_providers::google::{GoogleConfig, OAuthCredentials};

/// Configuration for the breakout client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google Calendar settings.
    pub google: Option<GoogleSettings>,

    /// Group creation settings.
    #[serde(default)]
    pub groups: GroupSettings,
}

/// Settings for event selection and group creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    /// Free-text filter matched against upcoming events.
    pub event_filter: String,

    /// Default number of events fetched per run.
    pub limit: usize,

    /// Default target attendees per group.
    pub group_size: usize,

    /// Shuffle seed used when `--seed` is not given.
    pub seed: u64,

    /// Summary prefix for created events; the group label is appended.
    pub summary_prefix: String,

    /// Description for created events.
    pub description: String,

    /// Audit log of each fetched event's raw attendee list.
    pub attendees_log: PathBuf,

    /// Audit log of each successfully created event.
    pub events_log: PathBuf,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            event_filter: "FLG meeting".to_string(),
            limit: 1,
            group_size: 3,
            seed: 42,
            summary_prefix: "FLG subgroup".to_string(),
            description: "Subgroup for brainstorming algo tasks".to_string(),
            attendees_log: PathBuf::from("attendees.jsonl"),
            events_log: PathBuf::from("created_events.jsonl"),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("failed to read config: {}", e))?;
            toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("breakout")
    }
}

/// Google Calendar settings from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    pub client_id: Option<String>,

    /// OAuth client secret (supports `pass::` and `env::` prefixes).
    pub client_secret: Option<String>,

    /// Calendar to read from and write to.
    pub calendar_id: Option<String>,

    /// Path to token storage.
    pub token_path: Option<PathBuf>,
}

impl GoogleSettings {
    /// Builds the provider configuration from these settings.
    pub fn to_provider_config(&self) -> Result<GoogleConfig, String> {
        let credentials = self.resolve_credentials()?;
        credentials.validate().map_err(|e| e.to_string())?;

        let mut config = GoogleConfig::new(credentials);

        if let Some(ref id) = self.calendar_id {
            config = config.with_calendar_id(id);
        }

        if let Some(ref path) = self.token_path {
            config = config.with_token_path(path);
        }

        Ok(config)
    }

    /// Resolves OAuth credentials from the inline fields.
    ///
    /// Both `client_id` and `client_secret` must be set; each is passed
    /// through [`crate::secret::resolve`] to expand references.
    pub(crate) fn resolve_credentials(&self) -> Result<OAuthCredentials, String> {
        let raw_id = self.client_id.as_deref().ok_or_else(|| {
            format!(
                "Google credentials not found. Add to {}:\n  \
                 [google]\n  \
                 client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                 client_secret = \"YOUR_SECRET\"\n\n  \
                 Or run: breakout auth --credentials-file <path>",
                ClientConfig::default_path().display()
            )
        })?;

        let raw_secret = self.client_secret.as_deref().ok_or_else(|| {
            "client_secret is missing from [google] section in config.toml".to_string()
        })?;

        let resolved_id = crate::secret::resolve(raw_id)
            .map_err(|e| format!("failed to resolve client_id: {}", e))?;
        let resolved_secret = crate::secret::resolve(raw_secret)
            .map_err(|e| format!("failed to resolve client_secret: {}", e))?;

        Ok(OAuthCredentials::new(resolved_id, resolved_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_settings_defaults() {
        let settings = GroupSettings::default();
        assert_eq!(settings.event_filter, "FLG meeting");
        assert_eq!(settings.limit, 1);
        assert_eq!(settings.group_size, 3);
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.summary_prefix, "FLG subgroup");
        assert_eq!(settings.attendees_log, PathBuf::from("attendees.jsonl"));
        assert_eq!(settings.events_log, PathBuf::from("created_events.jsonl"));
    }

    #[test]
    fn empty_config_parses_with_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert!(config.google.is_none());
        assert_eq!(config.groups.group_size, 3);
    }

    #[test]
    fn groups_section_overrides_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
[groups]
event_filter = "Retro"
group_size = 4
seed = 7
"#,
        )
        .unwrap();
        assert_eq!(config.groups.event_filter, "Retro");
        assert_eq!(config.groups.group_size, 4);
        assert_eq!(config.groups.seed, 7);
        // Untouched fields keep their defaults.
        assert_eq!(config.groups.summary_prefix, "FLG subgroup");
    }

    #[test]
    fn resolve_credentials_plain_text() {
        let settings = GoogleSettings {
            client_id: Some("test-id.apps.googleusercontent.com".to_string()),
            client_secret: Some("test-secret".to_string()),
            ..Default::default()
        };
        let creds = settings.resolve_credentials().unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn resolve_credentials_env_prefix() {
        unsafe {
            std::env::set_var("_BREAKOUT_TEST_CLIENT_ID", "env-id.apps.googleusercontent.com");
            std::env::set_var("_BREAKOUT_TEST_CLIENT_SECRET", "env-secret");
        }

        let settings = GoogleSettings {
            client_id: Some("env::_BREAKOUT_TEST_CLIENT_ID".to_string()),
            client_secret: Some("env::_BREAKOUT_TEST_CLIENT_SECRET".to_string()),
            ..Default::default()
        };
        let creds = settings.resolve_credentials().unwrap();
        assert_eq!(creds.client_id, "env-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "env-secret");

        unsafe {
            std::env::remove_var("_BREAKOUT_TEST_CLIENT_ID");
            std::env::remove_var("_BREAKOUT_TEST_CLIENT_SECRET");
        }
    }

    #[test]
    fn resolve_credentials_missing_fields_error() {
        let settings = GoogleSettings {
            client_secret: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(settings.resolve_credentials().is_err());

        let settings = GoogleSettings {
            client_id: Some("id.apps.googleusercontent.com".to_string()),
            ..Default::default()
        };
        let result = settings.resolve_credentials();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("client_secret"));

        assert!(GoogleSettings::default().resolve_credentials().is_err());
    }

    #[test]
    fn to_provider_config_applies_overrides() {
        let settings = GoogleSettings {
            client_id: Some("test.apps.googleusercontent.com".to_string()),
            client_secret: Some("test-secret".to_string()),
            calendar_id: Some("team@example.com".to_string()),
            token_path: Some(PathBuf::from("/tmp/breakout-tokens.json")),
        };
        let config = settings.to_provider_config().unwrap();
        assert_eq!(config.credentials.client_id, "test.apps.googleusercontent.com");
        assert_eq!(config.calendar_id, "team@example.com");
        assert_eq!(config.token_path, PathBuf::from("/tmp/breakout-tokens.json"));
    }

    #[test]
    fn config_toml_with_inline_credentials() {
        let toml_content = r#"
[google]
client_id = "toml-id.apps.googleusercontent.com"
client_secret = "toml-secret"
calendar_id = "primary"
"#;
        let config: ClientConfig = toml::from_str(toml_content).unwrap();
        let google = config.google.unwrap();
        let provider_config = google.to_provider_config().unwrap();
        assert_eq!(
            provider_config.credentials.client_id,
            "toml-id.apps.googleusercontent.com"
        );
    }

    #[test]
    fn config_toml_bare_google_section_errors_on_resolve() {
        let config: ClientConfig = toml::from_str("[google]\n").unwrap();
        assert!(config.google.unwrap().resolve_credentials().is_err());
    }
}
