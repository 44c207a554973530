//! Low-level Google Calendar API client.
//!
//! One GET (`events.list`) and one POST (`events.insert`), with bearer
//! authentication and per-status error mapping. Responses are parsed from
//! text so error bodies can be reported verbatim.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use breakout_core::{Attendee, Event, EventTime, ResponseStatus};

use crate::error::{ProviderError, ProviderResult};

use super::outbound::EventRequest;

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl GoogleCalendarClient {
    /// Creates a client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            access_token: access_token.into(),
        }
    }

    /// Replaces the access token after a refresh.
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Lists upcoming events from a calendar.
    ///
    /// Issues a single query for events starting at or after `time_min`,
    /// free-text matched against `query`, expanded to single occurrences,
    /// ordered by start time, capped at `max_results`.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        max_results: usize,
        query: &str,
    ) -> ProviderResult<Vec<Event>> {
        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(calendar_id)
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("q", query.to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let body = Self::read_success_body(response).await?;

        let list: EventListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse event list: {}", e))
        })?;

        let events: Vec<Event> = list.items.into_iter().filter_map(convert_event).collect();
        debug!("fetched {} events from calendar {}", events.len(), calendar_id);
        Ok(events)
    }

    /// Inserts one event, requesting conference creation and attendee
    /// notification emails.
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        request: &EventRequest,
    ) -> ProviderResult<Event> {
        request.validate()?;

        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(calendar_id)
        );

        let payload = serde_json::to_string(request).map_err(|e| {
            ProviderError::internal(format!("failed to serialize event request: {}", e))
        })?;

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(request_error)?;

        let body = Self::read_success_body(response).await?;

        let created: ApiEvent = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse created event: {}", e))
        })?;

        convert_event(created).ok_or_else(|| {
            ProviderError::invalid_response("created event is missing id or start time")
        })
    }

    /// Maps the status code and returns the body for successful responses.
    async fn read_success_body(response: reqwest::Response) -> ProviderResult<String> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::authentication(
                "access token expired or invalid",
            ));
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::authorization("access denied to calendar"));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )));
        }

        if status == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::bad_request(format!(
                "API rejected the request: {}",
                body
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::server(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))
    }
}

/// Maps a reqwest send error into the provider taxonomy.
fn request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    }
}

/// Converts an API event into the core model.
///
/// Cancelled events and events missing an id or start time are dropped.
fn convert_event(event: ApiEvent) -> Option<Event> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let id = event.id?;

    let start = parse_event_time(&event.start).or_else(|| {
        warn!("event {} has no usable start time", id);
        None
    })?;
    let end = parse_event_time(&event.end);

    let attendees = event
        .attendees
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| {
            let email = a.email?;
            let status = match a.response_status.as_deref() {
                Some("accepted") => ResponseStatus::Accepted,
                Some("declined") => ResponseStatus::Declined,
                Some("tentative") => ResponseStatus::Tentative,
                Some("needsAction") => ResponseStatus::NeedsAction,
                _ => ResponseStatus::Unknown,
            };
            Some(Attendee::new(email, status))
        })
        .collect();

    let mut converted = Event::new(id, event.summary.unwrap_or_default(), start);
    converted.end = end;
    converted.attendees = attendees;
    converted.html_link = event.html_link;
    Some(converted)
}

/// Parses a wire event time into the core enum.
fn parse_event_time(time: &ApiEventTime) -> Option<EventTime> {
    if let Some(ref dt) = time.date_time {
        let parsed = DateTime::parse_from_rfc3339(dt)
            .map_err(|e| warn!("failed to parse event time {:?}: {}", dt, e))
            .ok()?;
        return Some(EventTime::DateTime(parsed.with_timezone(&Utc)));
    }
    if let Some(ref date) = time.date {
        let parsed = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| warn!("failed to parse event date {:?}: {}", date, e))
            .ok()?;
        return Some(EventTime::Date(parsed));
    }
    None
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

/// A single event on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    start: ApiEventTime,
    #[serde(default)]
    end: ApiEventTime,
    html_link: Option<String>,
    status: Option<String>,
    attendees: Option<Vec<ApiAttendee>>,
}

/// Event time on the wire: date-time or all-day date.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

/// Attendee on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAttendee {
    email: Option<String>,
    response_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_event_list_response() {
        let json = r#"{
            "items": [
                {
                    "id": "event1",
                    "summary": "FLG meeting",
                    "start": { "dateTime": "2024-03-15T10:00:00Z" },
                    "end": { "dateTime": "2024-03-15T11:00:00Z" },
                    "status": "confirmed",
                    "attendees": [
                        { "email": "a@example.com", "responseStatus": "accepted" },
                        { "email": "b@example.com", "responseStatus": "declined" }
                    ]
                }
            ]
        }"#;

        let list: EventListResponse = serde_json::from_str(json).unwrap();
        let events: Vec<Event> = list.items.into_iter().filter_map(convert_event).collect();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.id, "event1");
        assert_eq!(event.summary, "FLG meeting");
        assert_eq!(
            event.start.as_instant(),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
        );
        assert_eq!(event.attendees.len(), 2);
        assert_eq!(event.attendees[0].response_status, ResponseStatus::Accepted);
        assert_eq!(event.attendees[1].response_status, ResponseStatus::Declined);
    }

    #[test]
    fn converts_all_day_event() {
        let json = r#"{
            "id": "event1",
            "summary": "Offsite",
            "start": { "date": "2024-03-15" },
            "end": { "date": "2024-03-16" }
        }"#;

        let event = convert_event(serde_json::from_str(json).unwrap()).unwrap();
        assert!(event.start.is_all_day());
    }

    #[test]
    fn drops_cancelled_events() {
        let json = r#"{
            "id": "event1",
            "summary": "Cancelled one",
            "status": "cancelled",
            "start": { "dateTime": "2024-03-15T10:00:00Z" },
            "end": { "dateTime": "2024-03-15T11:00:00Z" }
        }"#;

        assert!(convert_event(serde_json::from_str(json).unwrap()).is_none());
    }

    #[test]
    fn drops_events_without_start() {
        let json = r#"{ "id": "event1", "summary": "Broken" }"#;
        assert!(convert_event(serde_json::from_str(json).unwrap()).is_none());
    }

    #[test]
    fn unknown_response_status_is_not_accepted() {
        let json = r#"{
            "id": "event1",
            "summary": "Meeting",
            "start": { "dateTime": "2024-03-15T10:00:00Z" },
            "attendees": [ { "email": "a@example.com", "responseStatus": "delegated" } ]
        }"#;

        let event = convert_event(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(event.attendees[0].response_status, ResponseStatus::Unknown);
        assert!(!event.attendees[0].is_accepted());
    }

    #[test]
    fn parses_insert_response_with_link() {
        let json = r#"{
            "id": "created1",
            "summary": "FLG subgroup Fox",
            "start": { "dateTime": "2024-03-15T10:05:00Z" },
            "end": { "dateTime": "2024-03-15T10:50:00Z" },
            "htmlLink": "https://www.google.com/calendar/event?eid=abc",
            "attendees": [ { "email": "a@example.com", "responseStatus": "needsAction" } ]
        }"#;

        let event = convert_event(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(event.id, "created1");
        assert_eq!(
            event.html_link.as_deref(),
            Some("https://www.google.com/calendar/event?eid=abc")
        );
    }
}
