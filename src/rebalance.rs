//! Advisory ranking of rooms that could take unplaced occupants.

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::config::Settings;
use crate::model::entity::{Id, Occupant};
use crate::model::room::Room;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomVacancy {
    pub room_id: Id,
    pub room_name: String,
    pub capacity: usize,
    pub occupied: usize,
    pub vacant_seats: usize,
    pub occupancy_percent: f64,
    /// Vacant seats over capacity, 0 for rooms without capacity.
    pub vacancy_score: f64,
    /// Share of the unplaced occupants this room could take.
    pub suggested_count: usize,
}

impl RoomVacancy {
    fn measure(room: &Room) -> RoomVacancy {
        let (capacity, occupied) = if room.seats.is_empty() {
            // no layout yet: trust the recorded list
            (room.capacity.max(room.occupants.len()), room.occupants.len())
        } else {
            let capacity = room.assignable_seats();
            let occupied = room.seats.iter()
                .filter(|seat| seat.is_assignable() && seat.occupant.is_some())
                .count();
            (capacity, occupied)
        };
        let vacant_seats = capacity.saturating_sub(occupied);
        let (occupancy_percent, vacancy_score) = if capacity == 0 {
            (0.0, 0.0)
        } else {
            (
                occupied.min(capacity) as f64 / capacity as f64 * 100.0,
                vacant_seats as f64 / capacity as f64,
            )
        };
        RoomVacancy {
            room_id: room.id,
            room_name: room.name.clone(),
            capacity,
            occupied,
            vacant_seats,
            occupancy_percent,
            vacancy_score,
            suggested_count: 0,
        }
    }
}

/// Rooms by descending vacancy ratio, with the unplaced occupants spread
/// over them in rank order. Reads its inputs only.
///
/// `_settings` is accepted so callers can hand over the same triple they gave
/// the engine; no setting changes how vacancy is measured.
pub fn rank_rooms(unplaced: &[Occupant], rooms: &[Room], _settings: &Settings) -> Vec<RoomVacancy> {
    let mut ranked = rooms.iter()
        .map(RoomVacancy::measure)
        .sorted_by(|a, b| {
            b.vacancy_score.total_cmp(&a.vacancy_score)
                .then_with(|| b.vacant_seats.cmp(&a.vacant_seats))
                .then_with(|| a.room_id.cmp(&b.room_id))
        })
        .collect_vec();

    let mut left = unplaced.len();
    for room in ranked.iter_mut() {
        room.suggested_count = left.min(room.vacant_seats);
        left -= room.suggested_count;
    }
    debug!(rooms = ranked.len(), unplaced = unplaced.len(), unassigned = left, "ranked rooms by vacancy");
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::room::SeatKind;

    fn occupant(id: Id) -> Occupant {
        Occupant::new(id, "Name", "Surname", &id.to_string(), "9-A", "F")
    }

    fn with_seated(mut room: Room, seated: usize) -> Room {
        for (i, seat) in room.seats.iter_mut().take(seated).enumerate() {
            seat.occupant = Some(occupant(i as Id));
        }
        room
    }

    #[test]
    fn test_ranked_by_vacancy_ratio() {
        let rooms = vec![
            with_seated(Room::grid(1, "A101", &[(2, 5)]), 8),
            with_seated(Room::grid(2, "B202", &[(2, 2)]), 1),
            with_seated(Room::grid(3, "C303", &[(4, 5)]), 10),
        ];
        let unplaced: Vec<Occupant> = (100..106).map(occupant).collect();
        let ranked = rank_rooms(&unplaced, &rooms, &Settings::default());

        let order: Vec<Id> = ranked.iter().map(|r| r.room_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(ranked[0].vacant_seats, 3);
        assert!((ranked[0].vacancy_score - 0.75).abs() < 1e-12);
        assert!((ranked[1].occupancy_percent - 50.0).abs() < 1e-12);
        let suggested: Vec<usize> = ranked.iter().map(|r| r.suggested_count).collect();
        assert_eq!(suggested, vec![3, 3, 0]);
    }

    #[test]
    fn test_blocked_seats_do_not_count() {
        let mut room = Room::grid(1, "A101", &[(1, 4)]);
        room.seats[3].kind = SeatKind::Blocked;
        let ranked = rank_rooms(&[], &[room], &Settings::default());
        assert_eq!(ranked[0].capacity, 3);
        assert_eq!(ranked[0].vacant_seats, 3);
    }

    #[test]
    fn test_empty_room_without_capacity() {
        let room = Room { id: 9, name: "Hall".to_string(), capacity: 0, seats: Vec::new(), occupants: Vec::new() };
        let ranked = rank_rooms(&[occupant(1)], &[room], &Settings::default());
        assert_eq!(ranked[0].capacity, 0);
        assert_eq!(ranked[0].vacancy_score, 0.0);
        assert_eq!(ranked[0].occupancy_percent, 0.0);
        assert_eq!(ranked[0].suggested_count, 0);
    }
}
