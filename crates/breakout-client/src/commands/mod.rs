//! Command implementations.

pub mod auth;
pub mod config;
pub mod groups;
pub mod list;

use chrono::{DateTime, Utc};

use breakout_core::{parse_date_min, EventTime};
use breakout_providers::google::GoogleCalendar;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Builds the calendar service from configuration.
pub(crate) fn build_calendar(config: &ClientConfig) -> ClientResult<GoogleCalendar> {
    let google = config.google.as_ref().ok_or_else(|| {
        ClientError::Config(format!(
            "Google credentials are required. Add a [google] section to {} \
             or run: breakout auth --credentials-file <path>",
            ClientConfig::default_path().display()
        ))
    })?;

    let provider_config = google.to_provider_config().map_err(ClientError::Config)?;
    GoogleCalendar::new(provider_config).map_err(Into::into)
}

/// Resolves the `--date-min` argument to a UTC instant, defaulting to now.
pub(crate) fn resolve_time_min(date_min: Option<&str>) -> ClientResult<DateTime<Utc>> {
    match date_min {
        Some(value) => {
            parse_date_min(value).map_err(|e| ClientError::InvalidArgument(e.to_string()))
        }
        None => Ok(Utc::now()),
    }
}

/// Formats an event time for status output.
pub(crate) fn format_event_time(time: &EventTime) -> String {
    match time {
        EventTime::DateTime(dt) => dt.to_rfc3339(),
        EventTime::Date(date) => date.to_string(),
    }
}
