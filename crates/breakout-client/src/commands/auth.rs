//! The `auth` command.
//!
//! Resolves OAuth client credentials from CLI flags, a `--credentials-file`,
//! or `config.toml`, then runs the consent flow. Credentials supplied on
//! the command line are persisted to `config.toml` so later runs find them.

use std::path::PathBuf;

use tracing::info;

use breakout_providers::google::{GoogleCalendar, OAuthCredentials};

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::{ClientError, ClientResult};

/// Runs the Google authentication flow.
pub async fn run(
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials_file: Option<PathBuf>,
    force: bool,
    config: &ClientConfig,
) -> ClientResult<()> {
    let (final_client_id, final_client_secret, source) = resolve_credentials(
        client_id,
        client_secret,
        credentials_file,
        config.google.as_ref(),
    )?;

    let credentials = OAuthCredentials::new(&final_client_id, &final_client_secret);
    credentials
        .validate()
        .map_err(|e| ClientError::Config(format!("invalid Google credentials: {}", e)))?;

    let settings = GoogleSettings {
        client_id: Some(final_client_id.clone()),
        client_secret: Some(final_client_secret.clone()),
        calendar_id: config.google.as_ref().and_then(|g| g.calendar_id.clone()),
        token_path: config.google.as_ref().and_then(|g| g.token_path.clone()),
    };
    let provider_config = settings.to_provider_config().map_err(ClientError::Config)?;
    let calendar = GoogleCalendar::new(provider_config)?;

    if calendar.is_authenticated() && !force {
        persist_credentials(&final_client_id, &final_client_secret, &source);
        println!("Already authenticated with Google Calendar.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    println!("Starting Google Calendar authentication...");
    println!();
    println!("A browser window will open for you to authorize access.");
    println!("If the browser doesn't open, check the terminal for a URL to copy.");
    println!();

    calendar.authenticate().await?;

    persist_credentials(&final_client_id, &final_client_secret, &source);

    info!("Google authentication successful");
    println!();
    println!("Authentication successful!");
    println!("Your Google Calendar tokens have been saved.");

    Ok(())
}

/// Where the credentials were resolved from.
#[derive(Debug, PartialEq)]
enum CredentialSource {
    /// From CLI flags or a credentials file.
    Cli,
    /// From config.toml (already persisted).
    Config,
}

/// Resolves credentials by priority: CLI flags, then a credentials file,
/// then `config.toml`.
fn resolve_credentials(
    cli_client_id: Option<String>,
    cli_client_secret: Option<String>,
    cli_credentials_file: Option<PathBuf>,
    config_google: Option<&GoogleSettings>,
) -> ClientResult<(String, String, CredentialSource)> {
    if let (Some(id), Some(secret)) = (&cli_client_id, &cli_client_secret) {
        return Ok((id.clone(), secret.clone(), CredentialSource::Cli));
    }

    if let Some(ref path) = cli_credentials_file {
        let creds = OAuthCredentials::from_file(path).map_err(|e| {
            ClientError::Config(format!(
                "failed to load credentials from {}: {}",
                path.display(),
                e
            ))
        })?;
        return Ok((creds.client_id, creds.client_secret, CredentialSource::Cli));
    }

    if let Some(google) = config_google {
        if google.client_id.is_some() && google.client_secret.is_some() {
            let creds = google.resolve_credentials().map_err(|e| {
                ClientError::Config(format!(
                    "failed to resolve Google credentials from config: {}",
                    e
                ))
            })?;
            return Ok((creds.client_id, creds.client_secret, CredentialSource::Config));
        }
    }

    if cli_client_id.is_some() || cli_client_secret.is_some() {
        return Err(ClientError::Config(
            "both --client-id and --client-secret are required when providing credentials directly"
                .to_string(),
        ));
    }

    let config_path = ClientConfig::default_path();
    Err(ClientError::Config(format!(
        "Google credentials are required. Provide via:\n  \
         - client_id + client_secret in {}\n  \
         - --client-id and --client-secret flags\n  \
         - --credentials-file flag (path to Google Cloud Console JSON)\n  \
         - GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET env vars",
        config_path.display()
    )))
}

/// Saves credentials into `config.toml` under `[google]`.
///
/// No-op when the credentials already came from config.toml.
fn persist_credentials(client_id: &str, client_secret: &str, source: &CredentialSource) {
    if *source == CredentialSource::Config {
        return;
    }

    let config_path = ClientConfig::default_path();

    let content = if config_path.exists() {
        std::fs::read_to_string(&config_path).unwrap_or_default()
    } else {
        String::new()
    };

    let mut doc = match content.parse::<toml_edit::DocumentMut>() {
        Ok(d) => d,
        Err(e) => {
            info!("could not parse config.toml for writing: {}", e);
            return;
        }
    };

    if !doc.contains_key("google") {
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    if let Some(google) = doc["google"].as_table_mut() {
        google["client_id"] = toml_edit::value(client_id);
        google["client_secret"] = toml_edit::value(client_secret);
    }

    if let Some(parent) = config_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            info!("could not create config directory {}: {}", parent.display(), e);
            return;
        }
    }

    match std::fs::write(&config_path, doc.to_string()) {
        Ok(()) => {
            println!("Credentials saved to {}", config_path.display());
        }
        Err(e) => {
            info!("could not save credentials to {}: {}", config_path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_from_cli_flags() {
        let result = resolve_credentials(
            Some("cli-id.apps.googleusercontent.com".to_string()),
            Some("cli-secret".to_string()),
            None,
            None,
        );
        let (id, secret, source) = result.unwrap();
        assert_eq!(id, "cli-id.apps.googleusercontent.com");
        assert_eq!(secret, "cli-secret");
        assert_eq!(source, CredentialSource::Cli);
    }

    #[test]
    fn resolves_from_config() {
        let settings = GoogleSettings {
            client_id: Some("config-id.apps.googleusercontent.com".to_string()),
            client_secret: Some("config-secret".to_string()),
            ..Default::default()
        };
        let (id, _, source) = resolve_credentials(None, None, None, Some(&settings)).unwrap();
        assert_eq!(id, "config-id.apps.googleusercontent.com");
        assert_eq!(source, CredentialSource::Config);
    }

    #[test]
    fn cli_flags_override_config() {
        let settings = GoogleSettings {
            client_id: Some("config-id.apps.googleusercontent.com".to_string()),
            client_secret: Some("config-secret".to_string()),
            ..Default::default()
        };
        let (id, _, source) = resolve_credentials(
            Some("cli-id.apps.googleusercontent.com".to_string()),
            Some("cli-secret".to_string()),
            None,
            Some(&settings),
        )
        .unwrap();
        assert_eq!(id, "cli-id.apps.googleusercontent.com");
        assert_eq!(source, CredentialSource::Cli);
    }

    #[test]
    fn partial_cli_flags_fail() {
        assert!(resolve_credentials(
            Some("id.apps.googleusercontent.com".to_string()),
            None,
            None,
            None
        )
        .is_err());

        assert!(resolve_credentials(None, Some("secret".to_string()), None, None).is_err());
    }

    #[test]
    fn no_credentials_anywhere_fails() {
        assert!(resolve_credentials(None, None, None, None).is_err());
    }

    #[test]
    fn resolves_from_credentials_file() {
        let tmp = tempfile::tempdir().unwrap();
        let creds_path = tmp.path().join("creds.json");
        std::fs::write(
            &creds_path,
            r#"{
                "installed": {
                    "client_id": "file-id.apps.googleusercontent.com",
                    "client_secret": "file-secret"
                }
            }"#,
        )
        .unwrap();

        let (id, secret, source) =
            resolve_credentials(None, None, Some(creds_path), None).unwrap();
        assert_eq!(id, "file-id.apps.googleusercontent.com");
        assert_eq!(secret, "file-secret");
        assert_eq!(source, CredentialSource::Cli);
    }

    #[test]
    fn persist_skips_when_source_is_config() {
        // Verifies the no-op path doesn't touch the filesystem or panic.
        persist_credentials("id", "secret", &CredentialSource::Config);
    }

    #[test]
    fn toml_edit_round_trip_preserves_other_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[groups]\nevent_filter = \"Retro\"\n").unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        let mut doc: toml_edit::DocumentMut = content.parse().unwrap();
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
        if let Some(google) = doc["google"].as_table_mut() {
            google["client_id"] = toml_edit::value("test.apps.googleusercontent.com");
            google["client_secret"] = toml_edit::value("test-secret");
        }
        std::fs::write(&config_path, doc.to_string()).unwrap();

        let reloaded: ClientConfig =
            toml::from_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();
        let google = reloaded.google.unwrap();
        assert_eq!(
            google.client_id,
            Some("test.apps.googleusercontent.com".to_string())
        );
        assert_eq!(reloaded.groups.event_filter, "Retro");
    }
}
