//! The Google Calendar service.
//!
//! [`GoogleCalendar`] owns the credential lifecycle and the API client:
//! `ensure_access` loads persisted tokens, refreshes them when expired, and
//! falls back to the interactive consent flow; `fetch_upcoming` and
//! `create_event` issue the two API calls this tool makes.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use breakout_core::Event;

use crate::error::{ProviderError, ProviderResult};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::outbound::EventRequest;
use super::tokens::TokenStorage;

/// Google Calendar service.
pub struct GoogleCalendar {
    config: GoogleConfig,
    token_storage: TokenStorage,
    oauth_client: OAuthClient,
    api_client: RwLock<Option<GoogleCalendarClient>>,
}

impl GoogleCalendar {
    /// Creates the service, loading any persisted tokens.
    ///
    /// This does not start authentication; call [`ensure_access`] (or
    /// [`authenticate`] for an explicit consent flow) before using the API.
    ///
    /// [`ensure_access`]: Self::ensure_access
    /// [`authenticate`]: Self::authenticate
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let token_storage = TokenStorage::new(&config.token_path);
        let _ = token_storage.load();

        let oauth_client = OAuthClient::new(config.credentials.clone(), config.timeout);

        let api_client = token_storage
            .get()
            .filter(|tokens| !tokens.is_expired())
            .map(|tokens| GoogleCalendarClient::new(&tokens.access_token, config.timeout));

        Ok(Self {
            config,
            token_storage,
            oauth_client,
            api_client: RwLock::new(api_client),
        })
    }

    /// Returns true if usable tokens exist (valid, or refreshable).
    pub fn is_authenticated(&self) -> bool {
        match self.token_storage.get() {
            Some(tokens) => !tokens.is_expired() || tokens.refresh_token.is_some(),
            None => false,
        }
    }

    /// Runs the interactive consent flow and persists the tokens.
    pub async fn authenticate(&self) -> ProviderResult<()> {
        info!("starting Google authentication flow");

        let tokens = self
            .oauth_client
            .authorize(&self.config.scopes, self.config.loopback_port_range)
            .await?;

        self.token_storage.set(tokens.clone())?;

        let client = GoogleCalendarClient::new(&tokens.access_token, self.config.timeout);
        *self.api_client.write().await = Some(client);

        info!("authentication successful");
        Ok(())
    }

    /// Makes sure a valid access token and API client exist.
    ///
    /// Persisted valid tokens are used as-is; expired tokens are refreshed
    /// in place when a refresh token exists; otherwise the interactive
    /// consent flow runs. The token store is rewritten on every successful
    /// refresh or consent.
    pub async fn ensure_access(&self) -> ProviderResult<()> {
        let Some(tokens) = self.token_storage.get() else {
            return self.authenticate().await;
        };

        if !tokens.is_expired() {
            return self.ensure_client(&tokens.access_token).await;
        }

        let Some(refresh_token) = tokens.refresh_token else {
            debug!("tokens expired with no refresh token, re-running consent");
            return self.authenticate().await;
        };

        debug!("refreshing expired access token");
        match self.oauth_client.refresh_token(&refresh_token).await {
            Ok((access_token, expires_in)) => {
                self.token_storage
                    .update_access_token(&access_token, expires_in)?;
                self.replace_client_token(&access_token).await;
                Ok(())
            }
            Err(e) if e.is_auth() => {
                // Refresh token revoked or expired; fall back to consent.
                debug!("token refresh rejected ({}), re-running consent", e);
                self.authenticate().await
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches upcoming events matching the free-text filter.
    pub async fn fetch_upcoming(
        &self,
        time_min: DateTime<Utc>,
        limit: usize,
        query: &str,
    ) -> ProviderResult<Vec<Event>> {
        let client = self.api_client.read().await;
        let client = client
            .as_ref()
            .ok_or_else(|| ProviderError::internal("API client not available"))?;

        client
            .list_events(&self.config.calendar_id, time_min, limit, query)
            .await
    }

    /// Creates one group event and returns it, including its link.
    pub async fn create_event(&self, request: &EventRequest) -> ProviderResult<Event> {
        let client = self.api_client.read().await;
        let client = client
            .as_ref()
            .ok_or_else(|| ProviderError::internal("API client not available"))?;

        client.insert_event(&self.config.calendar_id, request).await
    }

    /// Ensures an API client exists for the given token.
    async fn ensure_client(&self, access_token: &str) -> ProviderResult<()> {
        let mut client = self.api_client.write().await;
        if client.is_none() {
            *client = Some(GoogleCalendarClient::new(access_token, self.config.timeout));
        }
        Ok(())
    }

    /// Installs a fresh access token into the API client.
    async fn replace_client_token(&self, access_token: &str) {
        let mut client = self.api_client.write().await;
        match client.as_mut() {
            Some(c) => c.set_access_token(access_token),
            None => {
                *client = Some(GoogleCalendarClient::new(access_token, self.config.timeout));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::config::OAuthCredentials;
    use crate::google::tokens::TokenInfo;

    fn test_config(token_path: &std::path::Path) -> GoogleConfig {
        let credentials =
            OAuthCredentials::new("test-client.apps.googleusercontent.com", "test-secret");
        GoogleConfig::new(credentials).with_token_path(token_path)
    }

    fn temp_token_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "breakout-provider-test-{}-{}.json",
            std::process::id(),
            name
        ))
    }

    #[test]
    fn creation_without_tokens_succeeds() {
        let path = temp_token_path("absent");
        let calendar = GoogleCalendar::new(test_config(&path));
        assert!(calendar.is_ok());
    }

    #[test]
    fn not_authenticated_without_tokens() {
        let path = temp_token_path("unauth");
        let calendar = GoogleCalendar::new(test_config(&path)).unwrap();
        assert!(!calendar.is_authenticated());
    }

    #[test]
    fn authenticated_with_persisted_tokens() {
        let path = temp_token_path("persisted");
        let storage = TokenStorage::new(&path);
        storage
            .set(TokenInfo::new(
                "access",
                Some("refresh".to_string()),
                Some(3600),
                vec![GoogleConfig::DEFAULT_SCOPE.to_string()],
            ))
            .unwrap();

        let calendar = GoogleCalendar::new(test_config(&path)).unwrap();
        assert!(calendar.is_authenticated());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let path = temp_token_path("invalid");
        let mut config = test_config(&path);
        config.scopes.clear();
        assert!(GoogleCalendar::new(config).is_err());
    }

    #[tokio::test]
    async fn fetch_without_client_is_an_internal_error() {
        let path = temp_token_path("noclient");
        let calendar = GoogleCalendar::new(test_config(&path)).unwrap();
        let result = calendar.fetch_upcoming(Utc::now(), 5, "FLG meeting").await;
        assert!(result.is_err());
    }
}
