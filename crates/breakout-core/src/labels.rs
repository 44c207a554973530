//! Group label assignment.
//!
//! Labels come from a fixed pool of animal names. The pool is shuffled
//! independently of the attendee shuffle, then paired with groups in order.
//! When there are more groups than names, the extra groups get no label and
//! no event is created for them; a warning makes that visible.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

/// The fixed label pool.
pub const GROUP_NAMES: [&str; 18] = [
    "Bear",
    "Crocodile",
    "Deer",
    "Elephant",
    "Fox",
    "Giraffe",
    "Gorilla",
    "Hyena",
    "Jaguar",
    "Kangaroo",
    "Lion",
    "Monkey",
    "Panda",
    "Squirrel",
    "Tiger",
    "Wolf",
    "Yak",
    "Zebra",
];

/// Shuffles the label pool and returns one label per group, in group order.
///
/// Returns fewer than `group_count` labels when the pool is exhausted;
/// callers pairing labels with groups stop at the shorter sequence.
pub fn assign_labels<R: Rng + ?Sized>(group_count: usize, rng: &mut R) -> Vec<String> {
    let mut pool: Vec<&str> = GROUP_NAMES.to_vec();
    pool.shuffle(rng);

    if group_count > pool.len() {
        warn!(
            "{} groups but only {} labels; {} groups will be skipped",
            group_count,
            pool.len(),
            group_count - pool.len()
        );
    }

    pool.into_iter()
        .take(group_count)
        .map(String::from)
        .collect()
}
