//! Attendee partitioning.
//!
//! Splits an event's accepted attendees into randomly-shuffled groups of a
//! target size. The random source is passed in by the caller and seeded once
//! at process start, so a run is reproducible given the same input order and
//! seed.
//!
//! Invariants upheld by [`partition`]:
//!
//! - groups contain only attendees whose RSVP status is `accepted`
//! - no group is empty
//! - no group has a single member unless it is the only group (a trailing
//!   leftover attendee is merged into the previous group instead)

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::event::Attendee;

/// An ordered list of attendee emails forming one breakout group.
pub type Group = Vec<String>;

/// Errors from partition parameter validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupingError {
    /// The target group size must be at least 1.
    #[error("group size must be at least 1, got {0}")]
    InvalidChunkSize(usize),
}

/// Partitions accepted attendees into shuffled groups of `chunk_size`.
///
/// The final group may be smaller than `chunk_size`. A final group of
/// exactly one member is merged into the previous group when one exists;
/// if the single member is the only attendee, it stays as a group of one.
///
/// Zero accepted attendees produce an empty result.
///
/// # Errors
///
/// Returns [`GroupingError::InvalidChunkSize`] when `chunk_size` is zero.
/// This is checked before anything else so callers can reject bad
/// parameters before issuing remote calls.
pub fn partition<R: Rng + ?Sized>(
    attendees: &[Attendee],
    chunk_size: usize,
    rng: &mut R,
) -> Result<Vec<Group>, GroupingError> {
    if chunk_size == 0 {
        return Err(GroupingError::InvalidChunkSize(chunk_size));
    }

    let mut emails: Vec<String> = attendees
        .iter()
        .filter(|a| a.is_accepted())
        .map(|a| a.email.clone())
        .collect();
    emails.shuffle(rng);

    let mut groups: Vec<Group> = Vec::new();
    for chunk in emails.chunks(chunk_size) {
        if chunk.len() == 1
            && let Some(last) = groups.last_mut()
        {
            last.push(chunk[0].clone());
        } else {
            groups.push(chunk.to_vec());
        }
    }

    Ok(groups)
}
