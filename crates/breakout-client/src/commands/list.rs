//! The `list-events` command.

use breakout_core::Event;

use crate::config::ClientConfig;
use crate::error::ClientResult;

use super::{build_calendar, format_event_time, resolve_time_min};

/// Fetches and prints upcoming events matching the configured filter.
///
/// Remote failures are printed and swallowed; only a failed credential
/// bootstrap or bad arguments propagate.
pub async fn run(
    date_min: Option<String>,
    limit: Option<usize>,
    config: &ClientConfig,
) -> ClientResult<()> {
    let limit = limit.unwrap_or(config.groups.limit);
    let time_min = resolve_time_min(date_min.as_deref())?;

    let calendar = build_calendar(config)?;
    calendar.ensure_access().await?;

    let filter = &config.groups.event_filter;
    println!(
        "Getting the upcoming {} events, using filter {:?}, starting from {}",
        limit,
        filter,
        time_min.to_rfc3339()
    );

    let events = match calendar.fetch_upcoming(time_min, limit, filter).await {
        Ok(events) => events,
        Err(e) => {
            println!("An error occurred: {}", e);
            return Ok(());
        }
    };

    if events.is_empty() {
        println!("No upcoming events found.");
        return Ok(());
    }

    for event in &events {
        print_event(event);
    }

    Ok(())
}

/// Prints one event's start, summary, and attendee list.
fn print_event(event: &Event) {
    println!("{} {}", format_event_time(&event.start), event.summary);
    for attendee in &event.attendees {
        println!("  {} ({})", attendee.email, attendee.response_status.as_str());
    }
}
