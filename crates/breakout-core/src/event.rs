//! Calendar event types.
//!
//! [`Event`] is the in-memory representation of an event as fetched from the
//! calendar backend. It is read-only in this tool: group events are built as
//! separate outbound payloads, never by mutating a fetched event.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// The start or end time of an event.
///
/// Calendar backends return either an RFC 3339 date-time or a bare date for
/// all-day events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific instant in UTC.
    DateTime(DateTime<Utc>),
    /// An all-day event date.
    Date(NaiveDate),
}

impl EventTime {
    /// Returns true if this is an all-day time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Resolves this time to an absolute UTC instant.
    ///
    /// All-day dates resolve to midnight UTC, which is the base instant used
    /// when deriving group-event times from an all-day source event.
    pub fn as_instant(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => *dt,
            Self::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

/// An attendee's RSVP status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    /// The attendee accepted the invitation.
    Accepted,
    /// The attendee declined the invitation.
    Declined,
    /// The attendee tentatively accepted.
    Tentative,
    /// The attendee has not responded.
    NeedsAction,
    /// Anything the backend sent that we do not recognize.
    #[default]
    Unknown,
}

impl ResponseStatus {
    /// Returns the wire-format name for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
            Self::NeedsAction => "needsAction",
            Self::Unknown => "unknown",
        }
    }
}

/// An attendee of a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// The attendee's email address.
    pub email: String,
    /// The attendee's RSVP status.
    #[serde(default)]
    pub response_status: ResponseStatus,
}

impl Attendee {
    /// Creates an attendee with the given email and status.
    pub fn new(email: impl Into<String>, response_status: ResponseStatus) -> Self {
        Self {
            email: email.into(),
            response_status,
        }
    }

    /// Returns true if the attendee accepted the invitation.
    pub fn is_accepted(&self) -> bool {
        self.response_status == ResponseStatus::Accepted
    }
}

/// A calendar event as fetched from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The backend's event identifier.
    pub id: String,
    /// The event title.
    pub summary: String,
    /// When the event starts.
    pub start: EventTime,
    /// When the event ends, if the backend provided one.
    pub end: Option<EventTime>,
    /// The invited attendees, in the order the backend returned them.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Shareable link to the event in the calendar UI.
    pub html_link: Option<String>,
}

impl Event {
    /// Creates an event with the given id, summary, and start time.
    pub fn new(id: impl Into<String>, summary: impl Into<String>, start: EventTime) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            start,
            end: None,
            attendees: Vec::new(),
            html_link: None,
        }
    }

    /// Returns the attendees that accepted the invitation.
    pub fn accepted_attendees(&self) -> impl Iterator<Item = &Attendee> {
        self.attendees.iter().filter(|a| a.is_accepted())
    }
}
