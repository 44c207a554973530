//! Core types: events, attendee grouping, group labels, time parsing

pub mod event;
pub mod grouping;
pub mod labels;
pub mod time;
pub mod tracing;

pub use event::{Attendee, Event, EventTime, ResponseStatus};
pub use grouping::{partition, Group, GroupingError};
pub use labels::{assign_labels, GROUP_NAMES};
pub use time::{parse_date_min, TimeParseError};
pub use tracing::{init_tracing, TracingConfig, TracingError};
