//! Typed outbound event payloads.
//!
//! Group events are built as explicit structs and validated before
//! submission, rather than assembled as loose JSON. The wire shapes follow
//! the Calendar API `events.insert` body.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use breakout_core::Event;

use crate::error::{ProviderError, ProviderResult};

/// Offset of a group event's start from the source event's start.
const START_OFFSET_MINUTES: i64 = 5;

/// Offset of a group event's end from the source event's start. Group
/// events always run 45 minutes, independent of the source duration.
const END_OFFSET_MINUTES: i64 = 50;

/// Conference solution requested for every group event.
const CONFERENCE_SOLUTION: &str = "hangoutsMeet";

/// An `events.insert` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Vec<AttendeeEntry>,
    pub reminders: Reminders,
    pub conference_data: ConferenceData,
}

/// A date-time bound of an outbound event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: DateTime<Utc>,
}

/// One attendee entry; only the email is sent, the organizer is implicit.
#[derive(Debug, Clone, Serialize)]
pub struct AttendeeEntry {
    pub email: String,
}

/// Reminder settings: defaults off, explicit overrides only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

/// A single reminder override.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

/// Request for an auto-generated conference link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    pub create_request: CreateConferenceRequest,
}

/// The create request; `request_id` keys idempotent conference creation on
/// the backend side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConferenceRequest {
    pub conference_solution_key: ConferenceSolutionKey,
    pub request_id: String,
}

/// Which conferencing product to attach.
#[derive(Debug, Clone, Serialize)]
pub struct ConferenceSolutionKey {
    #[serde(rename = "type")]
    pub solution_type: String,
}

impl EventRequest {
    /// Builds the event request for one group of a source event.
    ///
    /// The new event starts 5 minutes after the source event's start
    /// instant and ends 50 minutes after it. All-day source events use
    /// midnight UTC as the base instant. Reminders are an email at 10
    /// minutes and a popup at 5 minutes before start; the conference
    /// request id is the group label.
    pub fn for_group(
        source: &Event,
        label: &str,
        members: &[String],
        summary_prefix: &str,
        description: &str,
    ) -> Self {
        let base = source.start.as_instant();

        Self {
            summary: format!("{} {}", summary_prefix, label),
            description: description.to_string(),
            start: EventDateTime {
                date_time: base + Duration::minutes(START_OFFSET_MINUTES),
            },
            end: EventDateTime {
                date_time: base + Duration::minutes(END_OFFSET_MINUTES),
            },
            attendees: members
                .iter()
                .map(|email| AttendeeEntry {
                    email: email.clone(),
                })
                .collect(),
            reminders: Reminders {
                use_default: false,
                overrides: vec![
                    ReminderOverride {
                        method: "email".to_string(),
                        minutes: 10,
                    },
                    ReminderOverride {
                        method: "popup".to_string(),
                        minutes: 5,
                    },
                ],
            },
            conference_data: ConferenceData {
                create_request: CreateConferenceRequest {
                    conference_solution_key: ConferenceSolutionKey {
                        solution_type: CONFERENCE_SOLUTION.to_string(),
                    },
                    request_id: label.to_string(),
                },
            },
        }
    }

    /// Checks the request before submission.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.summary.trim().is_empty() {
            return Err(ProviderError::bad_request("event summary must not be empty"));
        }
        if self.conference_data.create_request.request_id.trim().is_empty() {
            return Err(ProviderError::bad_request(
                "conference request id must not be empty",
            ));
        }
        if self.end.date_time <= self.start.date_time {
            return Err(ProviderError::bad_request(
                "event end must be after its start",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakout_core::EventTime;
    use chrono::{NaiveDate, TimeZone};

    fn source_at(start: EventTime) -> Event {
        Event::new("src1", "FLG meeting", start)
    }

    fn members() -> Vec<String> {
        vec!["a@example.com".to_string(), "b@example.com".to_string()]
    }

    fn build(source: &Event) -> EventRequest {
        EventRequest::for_group(
            source,
            "Fox",
            &members(),
            "FLG subgroup",
            "Subgroup for brainstorming algo tasks",
        )
    }

    #[test]
    fn offsets_are_five_and_fifty_minutes_from_source_start() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let mut source = source_at(EventTime::DateTime(start));
        // A source duration other than 45 minutes must not matter.
        source.end = Some(EventTime::DateTime(
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
        ));

        let request = build(&source);
        assert_eq!(
            request.start.date_time,
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 5, 0).unwrap()
        );
        assert_eq!(
            request.end.date_time,
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 50, 0).unwrap()
        );
    }

    #[test]
    fn all_day_source_uses_midnight_utc_base() {
        let source = source_at(EventTime::Date(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        ));
        let request = build(&source);
        assert_eq!(
            request.start.date_time,
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 5, 0).unwrap()
        );
        assert_eq!(
            request.end.date_time,
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 50, 0).unwrap()
        );
    }

    #[test]
    fn summary_and_request_id_reference_the_label() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let request = build(&source_at(EventTime::DateTime(start)));
        assert_eq!(request.summary, "FLG subgroup Fox");
        assert_eq!(request.conference_data.create_request.request_id, "Fox");
    }

    #[test]
    fn reminder_overrides_are_exact() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let request = build(&source_at(EventTime::DateTime(start)));

        assert!(!request.reminders.use_default);
        let overrides: Vec<(&str, u32)> = request
            .reminders
            .overrides
            .iter()
            .map(|o| (o.method.as_str(), o.minutes))
            .collect();
        assert_eq!(overrides, vec![("email", 10), ("popup", 5)]);
    }

    #[test]
    fn serializes_with_calendar_api_field_names() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let request = build(&source_at(EventTime::DateTime(start)));
        let value = serde_json::to_value(&request).unwrap();

        assert!(value["start"]["dateTime"].is_string());
        assert!(value["end"]["dateTime"].is_string());
        assert_eq!(value["reminders"]["useDefault"], false);
        assert_eq!(
            value["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
            "hangoutsMeet"
        );
        assert_eq!(
            value["conferenceData"]["createRequest"]["requestId"],
            "Fox"
        );
        assert_eq!(value["attendees"][0]["email"], "a@example.com");
    }

    #[test]
    fn validation_accepts_a_built_request() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        assert!(build(&source_at(EventTime::DateTime(start))).validate().is_ok());
    }

    #[test]
    fn validation_rejects_empty_summary_and_label() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let source = source_at(EventTime::DateTime(start));

        let request = EventRequest::for_group(&source, "Fox", &members(), "", "desc");
        // Prefix and label are joined with a space, so a blank prefix still
        // yields a non-empty summary.
        assert!(request.validate().is_ok());

        let mut request = build(&source);
        request.summary = "   ".to_string();
        assert!(request.validate().is_err());

        let mut request = build(&source);
        request.conference_data.create_request.request_id = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn validation_rejects_inverted_times() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let mut request = build(&source_at(EventTime::DateTime(start)));
        request.end.date_time = request.start.date_time;
        assert!(request.validate().is_err());
    }
}
