use thiserror::Error;

use crate::model::entity::Id;

/// Malformed occupant or room records, reported before any attempt runs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("occupant id {0} appears more than once")]
    DuplicateOccupant(Id),
    #[error("room id {0} appears more than once")]
    DuplicateRoom(Id),
    #[error("room {room_id} defines seat id {seat_id} more than once")]
    DuplicateSeat { room_id: Id, seat_id: Id },
    #[error("room {room_id} has two seats at group {group}, row {row}, column {column}")]
    DuplicatePosition { room_id: Id, group: u32, row: u32, column: u32 },
    #[error("occupant {occupant_id} is pinned without a room and seat")]
    IncompletePin { occupant_id: Id },
    #[error("occupant {occupant_id} is pinned to unknown room {room_id}")]
    UnknownPinRoom { occupant_id: Id, room_id: Id },
    #[error("occupant {occupant_id} is pinned to unknown seat {seat_id} in room {room_id}")]
    UnknownPinSeat { occupant_id: Id, room_id: Id, seat_id: Id },
    #[error("occupants {first} and {second} are both pinned to seat {seat_id} in room {room_id}")]
    PinConflict { room_id: Id, seat_id: Id, first: Id, second: Id },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlacementError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("placement worker stopped before sending a result")]
    WorkerStopped,
}
