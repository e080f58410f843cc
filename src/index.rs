//! Identity → seat lookup over a placement result.
//!
//! Saved results can outlive the records they were built from: an occupant's
//! internal id may be regenerated on re-import while the external number stays,
//! and numbers are occasionally reused for a different person. Lookups
//! therefore try the number first, then the id, and accept a hit only when
//! the recorded name still looks like the occupant's.

use std::collections::HashMap;

use crate::model::entity::{Id, Occupant};
use crate::model::room::Room;
use crate::numbering::desk_numbers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatLocation {
    pub room_name: String,
    pub room_id: Id,
    pub seat_number: usize,
    /// Full name of whoever sat there when the index was built.
    pub occupant_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Number,
    Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Found { location: &'a SeatLocation, matched_by: MatchedBy },
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn location(&self) -> Option<&'a SeatLocation> {
        match self {
            Resolution::Found { location, .. } => Some(*location),
            Resolution::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacementIndex {
    by_number: HashMap<String, SeatLocation>,
    by_id: HashMap<Id, SeatLocation>,
}

impl PlacementIndex {
    /// Scans every seat once. The first binding of a key wins.
    pub fn build(rooms: &[Room]) -> PlacementIndex {
        let mut index = PlacementIndex::default();
        for room in rooms {
            let numbers = desk_numbers(&room.seats);
            for (seat, seat_number) in room.seats.iter().zip(numbers) {
                let Some(occupant) = &seat.occupant else { continue };
                let location = SeatLocation {
                    room_name: room.name.clone(),
                    room_id: room.id,
                    seat_number,
                    occupant_name: occupant.full_name(),
                };
                let number = occupant.number.trim();
                if !number.is_empty() {
                    index.by_number.entry(number.to_string()).or_insert_with(|| location.clone());
                }
                index.by_id.entry(occupant.id).or_insert(location);
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn resolve(&self, occupant: &Occupant) -> Resolution<'_> {
        let name = occupant.full_name();
        let by_number = self.by_number.get(occupant.number.trim())
            .filter(|location| names_match(&name, &location.occupant_name));
        if let Some(location) = by_number {
            return Resolution::Found { location, matched_by: MatchedBy::Number };
        }
        let by_id = self.by_id.get(&occupant.id)
            .filter(|location| names_match(&name, &location.occupant_name));
        match by_id {
            Some(location) => Resolution::Found { location, matched_by: MatchedBy::Id },
            None => Resolution::NotFound,
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}

/// Equal names, or one containing the other with the same first name.
pub fn names_match(a: &str, b: &str) -> bool {
    let a = normalize_name(a);
    let b = normalize_name(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let contained = a.contains(&b) || b.contains(&a);
    contained && a.split(' ').next() == b.split(' ').next()
}
