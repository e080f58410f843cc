//! Desk numbering: the 1-based ordinal printed on each desk.
//!
//! Seats are ordered by group key, then row, then column. The ordinal depends
//! only on the layout, never on who sits where.

use itertools::Itertools;

use crate::model::entity::{Id, Index};
use crate::model::room::{Room, Seat};

/// Seat indices of `seats` in desk order.
pub fn desk_order(seats: &[Seat]) -> Vec<Index> {
    seats.iter()
        .enumerate()
        .into_group_map_by(|(_, seat)| seat.group)
        .into_iter()
        .sorted_by_key(|(group, _)| *group)
        .flat_map(|(_, members)| {
            members.into_iter()
                .sorted_by_key(|(index, seat)| (seat.row, seat.column, *index))
                .map(|(index, _)| index)
        })
        .collect()
}

/// Ordinal of every seat, indexed like `seats`.
pub fn desk_numbers(seats: &[Seat]) -> Vec<usize> {
    let mut numbers = vec![0; seats.len()];
    for (ordinal, index) in desk_order(seats).into_iter().enumerate() {
        numbers[index] = ordinal + 1;
    }
    numbers
}

/// Ordinal of `seat` among `seats`, matched by seat id.
pub fn desk_number(seat: &Seat, seats: &[Seat]) -> Option<usize> {
    desk_order(seats)
        .into_iter()
        .position(|index| seats[index].id == seat.id)
        .map(|position| position + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeskNumber {
    Ordinal(usize),
    /// Seat was not found in any known room; the number is `seat.id + 1`.
    Fallback(usize),
}

impl DeskNumber {
    pub fn value(&self) -> usize {
        match self {
            DeskNumber::Ordinal(n) | DeskNumber::Fallback(n) => *n,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DeskNumber::Fallback(_))
    }
}

/// Looks the seat up in its room when `room_id` is known, otherwise in every
/// room, and degrades to the raw id when nothing matches.
pub fn resolve_desk_number(seat: &Seat, room_id: Option<Id>, rooms: &[Room]) -> DeskNumber {
    let candidates = rooms.iter().filter(|room| room_id.map_or(true, |id| room.id == id));
    for room in candidates {
        if let Some(number) = desk_number(seat, &room.seats) {
            return DeskNumber::Ordinal(number);
        }
    }
    tracing::debug!(seat_id = seat.id, ?room_id, "seat not found in any room, using fallback desk number");
    DeskNumber::Fallback(seat.id as usize + 1)
}
