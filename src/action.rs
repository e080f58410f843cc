use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::RoomLayout;
use crate::config::Settings;
use crate::learning::{DeskRef, MoveContext, MoveRecord};
use crate::model::entity::{Index, Occupant};
use crate::model::result::PlacementResult;
use crate::model::room::Room;
use crate::numbering::{desk_numbers, desk_order};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatPosition {
    pub room_index: Index,
    pub seat_index: Index,
}

impl SeatPosition {
    pub fn new(room_index: Index, seat_index: Index) -> SeatPosition {
        SeatPosition { room_index, seat_index }
    }
}

/// A manual correction to a placement result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeatAction {
    Move { from: SeatPosition, to: SeatPosition },
    Swap(SeatPosition, SeatPosition),
    /// Seats the `unplaced_index`-th unplaced occupant.
    Seat { unplaced_index: Index, to: SeatPosition },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("Invalid position")]
    InvalidPosition,
    #[error("No occupant at the source seat")]
    EmptySeat,
    #[error("Target seat is already occupied")]
    SeatOccupied,
    #[error("No unplaced occupant at index {0}")]
    InvalidUnplaced(Index),
}

fn occupant_at(result: &PlacementResult, position: SeatPosition) -> Result<Option<&Occupant>, ActionError> {
    result.rooms.get(position.room_index)
        .and_then(|room| room.seats.get(position.seat_index))
        .map(|seat| seat.occupant.as_ref())
        .ok_or(ActionError::InvalidPosition)
}

fn neighbors_at(result: &PlacementResult, position: SeatPosition, settings: &Settings, exclude: &Occupant) -> Vec<Occupant> {
    let room = &result.rooms[position.room_index];
    let layout = RoomLayout::create(room, settings.adjacency, settings.neighbor_scope);
    layout.neighbors(position.seat_index).iter()
        .filter_map(|n| room.seats[*n].occupant.as_ref())
        .filter(|other| other.id != exclude.id)
        .cloned()
        .collect()
}

fn desk_ref(room: &Room, seat_index: Index) -> DeskRef {
    DeskRef {
        room_id: room.id,
        room_name: room.name.clone(),
        seat_id: room.seats[seat_index].id,
        desk_number: desk_numbers(&room.seats)[seat_index],
    }
}

fn set_occupant(result: &mut PlacementResult, position: SeatPosition, occupant: Option<Occupant>) {
    result.rooms[position.room_index].seats[position.seat_index].occupant = occupant;
}

fn refresh_room(room: &mut Room) {
    room.occupants = desk_order(&room.seats).into_iter()
        .filter_map(|index| room.seats[index].occupant.clone())
        .collect();
}

/// Applies `action` and returns one record per occupant that moved.
///
/// Records carry the neighbors each occupant had before and after, measured
/// with the adjacency of `settings`.
pub fn apply_action(
    result: &mut PlacementResult,
    action: SeatAction,
    settings: &Settings,
    at: DateTime<Utc>,
) -> Result<Vec<MoveRecord>, ActionError> {
    // (occupant, origin, destination)
    let moves: Vec<(Occupant, Option<SeatPosition>, SeatPosition)> = match action {
        SeatAction::Move { from, to } => {
            let occupant = occupant_at(result, from)?.ok_or(ActionError::EmptySeat)?.clone();
            if from == to {
                return Ok(Vec::new());
            }
            if occupant_at(result, to)?.is_some() {
                return Err(ActionError::SeatOccupied);
            }
            vec![(occupant, Some(from), to)]
        }
        SeatAction::Swap(a, b) => {
            if a == b {
                return Err(ActionError::InvalidPosition);
            }
            let first = occupant_at(result, a)?.ok_or(ActionError::EmptySeat)?.clone();
            let second = occupant_at(result, b)?.ok_or(ActionError::EmptySeat)?.clone();
            vec![(first, Some(a), b), (second, Some(b), a)]
        }
        SeatAction::Seat { unplaced_index, to } => {
            let occupant = result.unplaced_occupants.get(unplaced_index)
                .ok_or(ActionError::InvalidUnplaced(unplaced_index))?
                .clone();
            if occupant_at(result, to)?.is_some() {
                return Err(ActionError::SeatOccupied);
            }
            vec![(occupant, None, to)]
        }
    };

    let before: Vec<Vec<Occupant>> = moves.iter()
        .map(|(occupant, from, _)| from.map(|from| neighbors_at(result, from, settings, occupant)).unwrap_or_default())
        .collect();

    for (_, from, _) in &moves {
        if let Some(from) = from {
            set_occupant(result, *from, None);
        }
    }
    for (occupant, _, to) in &moves {
        set_occupant(result, *to, Some(occupant.clone()));
    }
    if let SeatAction::Seat { unplaced_index, .. } = action {
        result.unplaced_occupants.remove(unplaced_index);
    }

    let records = moves.into_iter().zip(before).map(|((occupant, from, to), neighbors_before)| {
        let neighbors_after = neighbors_at(result, to, settings, &occupant);
        MoveRecord {
            from: from.map(|from| desk_ref(&result.rooms[from.room_index], from.seat_index)),
            to: desk_ref(&result.rooms[to.room_index], to.seat_index),
            occupant,
            context: MoveContext { neighbors_before, neighbors_after },
            at,
        }
    }).collect();

    for room in result.rooms.iter_mut() {
        refresh_room(room);
    }
    result.refresh_statistics();
    tracing::debug!(?action, "applied manual seat action");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::place;
    use crate::model::entity::Id;

    fn person(id: Id, gender: &str) -> Occupant {
        Occupant::new(id, "Name", "Surname", &id.to_string(), &format!("{}-A", 9 + id), gender)
    }

    fn seated_row() -> PlacementResult {
        // two of three seats in a row taken, one occupant unplaced
        let rooms = vec![Room::grid(1, "A101", &[(1, 3)])];
        let mut result = place(&[person(1, "F"), person(2, "M")], &rooms, &Settings::default()).unwrap();
        result.unplaced_occupants.push(person(3, "F"));
        result.refresh_statistics();
        result
    }

    #[test]
    fn test_move_to_empty_seat() {
        let mut result = seated_row();
        let from = result.rooms[0].seats.iter().position(|s| s.occupant.is_some()).unwrap();
        let to = result.rooms[0].seats.iter().position(|s| s.occupant.is_none()).unwrap();
        let moved_id = result.rooms[0].seats[from].occupant.as_ref().unwrap().id;

        let records = apply_action(
            &mut result,
            SeatAction::Move { from: SeatPosition::new(0, from), to: SeatPosition::new(0, to) },
            &Settings::default(),
            Utc::now(),
        ).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].occupant.id, moved_id);
        assert_eq!(records[0].to.desk_number, to + 1);
        assert!(result.rooms[0].seats[from].occupant.is_none());
        assert_eq!(result.rooms[0].occupants.len(), 2);
    }

    #[test]
    fn test_swap_produces_two_records() {
        let mut result = seated_row();
        let taken: Vec<Index> = result.rooms[0].seats.iter().enumerate()
            .filter(|(_, s)| s.occupant.is_some())
            .map(|(i, _)| i)
            .collect();
        let records = apply_action(
            &mut result,
            SeatAction::Swap(SeatPosition::new(0, taken[0]), SeatPosition::new(0, taken[1])),
            &Settings::default(),
            Utc::now(),
        ).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].from.as_ref().map(|d| d.seat_id), Some(taken[0] as Id));
        assert_eq!(records[1].to.seat_id, taken[0] as Id);
        assert_eq!(result.statistics.placed, 2);
    }

    #[test]
    fn test_seat_unplaced_occupant() {
        let mut result = seated_row();
        let free = result.rooms[0].seats.iter().position(|s| s.occupant.is_none()).unwrap();
        let records = apply_action(
            &mut result,
            SeatAction::Seat { unplaced_index: 0, to: SeatPosition::new(0, free) },
            &Settings::default(),
            Utc::now(),
        ).unwrap();
        assert!(records[0].from.is_none());
        assert!(result.unplaced_occupants.is_empty());
        assert_eq!(result.statistics.placed, 3);
        assert_eq!(result.statistics.unplaced, 0);
    }

    #[test]
    fn test_rejected_actions_leave_result_untouched() {
        let mut result = seated_row();
        let snapshot = result.clone();
        let free = result.rooms[0].seats.iter().position(|s| s.occupant.is_none()).unwrap();
        let taken = result.rooms[0].seats.iter().position(|s| s.occupant.is_some()).unwrap();
        let settings = Settings::default();

        let err = apply_action(&mut result, SeatAction::Move { from: SeatPosition::new(0, free), to: SeatPosition::new(0, taken) }, &settings, Utc::now());
        assert_eq!(err, Err(ActionError::EmptySeat));
        let err = apply_action(&mut result, SeatAction::Move { from: SeatPosition::new(0, taken), to: SeatPosition::new(4, 0) }, &settings, Utc::now());
        assert_eq!(err, Err(ActionError::InvalidPosition));
        let err = apply_action(&mut result, SeatAction::Seat { unplaced_index: 0, to: SeatPosition::new(0, taken) }, &settings, Utc::now());
        assert_eq!(err, Err(ActionError::SeatOccupied));
        let err = apply_action(&mut result, SeatAction::Seat { unplaced_index: 5, to: SeatPosition::new(0, free) }, &settings, Utc::now());
        assert_eq!(err, Err(ActionError::InvalidUnplaced(5)));
        assert_eq!(result, snapshot);
    }
}
