//! The `create-groups` command.
//!
//! For each fetched event: log the raw attendee list, partition the
//! accepted attendees into shuffled groups, assign labels from the shuffled
//! pool, and create one conference-enabled event per labeled group. A
//! failed creation is printed and skipped; the loop continues with the next
//! group. Nothing is rolled back.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use breakout_core::{assign_labels, partition};
use breakout_providers::google::EventRequest;

use crate::audit;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

use super::{build_calendar, format_event_time, resolve_time_min};

/// Creates breakout-group events for each matching upcoming event.
pub async fn run(
    date_min: Option<String>,
    limit: Option<usize>,
    group_size: Option<usize>,
    seed: Option<u64>,
    config: &ClientConfig,
) -> ClientResult<()> {
    let limit = limit.unwrap_or(config.groups.limit);
    let group_size = group_size.unwrap_or(config.groups.group_size);
    if group_size == 0 {
        return Err(ClientError::InvalidArgument(
            "group size must be at least 1".to_string(),
        ));
    }

    let seed = seed.unwrap_or(config.groups.seed);
    let mut rng = StdRng::seed_from_u64(seed);
    debug!("shuffle seed: {}", seed);

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
        audit::append_line(&config.groups.attendees_log, &event.attendees)?;

        let groups = partition(&event.attendees, group_size, &mut rng)?;
        println!(
            "Created {} groups for event {} {}",
            groups.len(),
            event.summary,
            format_event_time(&event.start)
        );

        let labels = assign_labels(groups.len(), &mut rng);
        for (label, group) in labels.iter().zip(groups.iter()) {
            let request = EventRequest::for_group(
                event,
                label,
                group,
                &config.groups.summary_prefix,
                &config.groups.description,
            );

            match calendar.create_event(&request).await {
                Ok(created) => {
                    println!(
                        "Event created: {}",
                        created.html_link.as_deref().unwrap_or("(no link)")
                    );
                    audit::append_line(&config.groups.events_log, &created)?;
                }
                Err(e) => {
                    println!("An error occurred: {}", e);
                }
            }
        }
    }

    Ok(())
}
