//! Vote tally.
//!
//! Votes are scanned in player join order. Ties go to the candidate that
//! first appeared during the scan.

use crate::types::{PlayerId, Room};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub counts: BTreeMap<PlayerId, u32>,
    /// `None` only when no votes were cast
    pub most_voted: Option<PlayerId>,
}

/// Count votes given as voted-for ids in scan order
pub fn tally<'a, I>(votes: I) -> Tally
where
    I: IntoIterator<Item = &'a str>,
{
    let mut first_seen: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();

    for target in votes {
        let count = counts.entry(target).or_insert(0);
        if *count == 0 {
            first_seen.push(target);
        }
        *count += 1;
    }

    let mut best: Option<(&str, u32)> = None;
    for &id in &first_seen {
        let count = counts[id];
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((id, count));
        }
    }

    Tally {
        counts: counts
            .into_iter()
            .map(|(id, count)| (id.to_string(), count))
            .collect(),
        most_voted: best.map(|(id, _)| id.to_string()),
    }
}

/// Tally the votes currently recorded on a room
pub fn tally_room(room: &Room) -> Tally {
    tally(
        room.players_in_join_order()
            .into_iter()
            .filter_map(|p| p.vote.as_deref()),
    )
}
