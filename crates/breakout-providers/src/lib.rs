//! Google Calendar access for breakout.
//!
//! This crate owns everything that talks to the outside world:
//!
//! - [`google::GoogleCalendar`] — the calendar service (credential
//!   bootstrap, event fetch, group-event creation)
//! - [`google::EventRequest`] — typed outbound event payload
//! - [`ProviderError`] — error taxonomy for remote operations
//!
//! The rest of the workspace depends only on these types, never on the
//! transport underneath them.

pub mod error;
pub mod google;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
