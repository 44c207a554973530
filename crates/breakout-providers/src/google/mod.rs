//! Google Calendar backend.
//!
//! Authentication uses the OAuth 2.0 authorization-code flow with PKCE and a
//! loopback redirect:
//!
//! 1. User supplies their own OAuth client id/secret (Google requires a
//!    registered application)
//! 2. A local HTTP listener is bound on a port from the configured range
//! 3. The browser is opened to Google's consent page with a PKCE challenge
//! 4. Google redirects back to the listener with the authorization code
//! 5. The code is exchanged for access and refresh tokens, which are
//!    persisted for later runs
//!
//! Calendar access itself is two REST calls: `events.list` for the upcoming
//! filtered events and `events.insert` for the per-group events.

mod client;
mod config;
mod oauth;
mod outbound;
mod provider;
mod tokens;

pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, PkceFlow};
pub use outbound::EventRequest;
pub use provider::GoogleCalendar;
pub use tokens::{TokenInfo, TokenStorage};
