pub mod entity {
    use serde::{Deserialize, Serialize};

    pub type Id = u32;
    pub type Index = usize;

    /// A person who needs a seat for the session.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Occupant {
        pub id: Id,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub surname: String,
        /// External key, stable across record re-imports.
        #[serde(default)]
        pub number: String,
        #[serde(default)]
        pub cohort: String,
        /// Raw gender attribute, normalized only when constraints are checked.
        #[serde(default, alias = "genderAttribute")]
        pub gender: String,
        #[serde(default)]
        pub pinned: bool,
        #[serde(default)]
        pub pinned_room_id: Option<Id>,
        #[serde(default)]
        pub pinned_seat_id: Option<Id>,
        #[serde(default)]
        pub special_case: bool,
    }

    impl Occupant {
        pub fn new(id: Id, name: &str, surname: &str, number: &str, cohort: &str, gender: &str) -> Occupant {
            Occupant {
                id,
                name: name.to_string(),
                surname: surname.to_string(),
                number: number.to_string(),
                cohort: cohort.to_string(),
                gender: gender.to_string(),
                pinned: false,
                pinned_room_id: None,
                pinned_seat_id: None,
                special_case: false,
            }
        }

        pub fn pinned_to(mut self, room_id: Id, seat_id: Id) -> Occupant {
            self.pinned = true;
            self.pinned_room_id = Some(room_id);
            self.pinned_seat_id = Some(seat_id);
            self
        }

        pub fn special(mut self) -> Occupant {
            self.special_case = true;
            self
        }

        pub fn full_name(&self) -> String {
            format!("{} {}", self.name.trim(), self.surname.trim()).trim().to_string()
        }

        /// `(room_id, seat_id)` when the occupant is pinned to a complete location.
        pub fn pin(&self) -> Option<(Id, Id)> {
            if !self.pinned {
                return None;
            }
            Some((self.pinned_room_id?, self.pinned_seat_id?))
        }
    }
}

pub mod room {
    use serde::{Deserialize, Serialize};
    use super::entity::{Id, Occupant};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SeatKind {
        #[default]
        Standard,
        Accessible,
        Blocked,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Seat {
        pub id: Id,
        #[serde(default)]
        pub group: u32,
        pub row: u32,
        pub column: u32,
        #[serde(default)]
        pub kind: SeatKind,
        #[serde(default)]
        pub occupant: Option<Occupant>,
    }

    impl Seat {
        pub fn new(id: Id, group: u32, row: u32, column: u32) -> Seat {
            Seat { id, group, row, column, kind: SeatKind::Standard, occupant: None }
        }

        pub fn is_assignable(&self) -> bool {
            self.kind != SeatKind::Blocked
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Room {
        pub id: Id,
        pub name: String,
        #[serde(default)]
        pub capacity: usize,
        #[serde(default)]
        pub seats: Vec<Seat>,
        #[serde(default)]
        pub occupants: Vec<Occupant>,
    }

    impl Room {
        /// Builds a room from `(rows, columns)` per group, numbering seat ids
        /// from zero in group, row, column order.
        pub fn grid(id: Id, name: &str, groups: &[(u32, u32)]) -> Room {
            let mut seats = Vec::new();
            for (group, (rows, columns)) in groups.iter().enumerate() {
                for row in 0..*rows {
                    for column in 0..*columns {
                        seats.push(Seat::new(seats.len() as Id, group as u32, row, column));
                    }
                }
            }
            Room { id, name: name.to_string(), capacity: seats.len(), seats, occupants: Vec::new() }
        }

        pub fn seat_index(&self, seat_id: Id) -> Option<usize> {
            self.seats.iter().position(|seat| seat.id == seat_id)
        }

        pub fn assignable_seats(&self) -> usize {
            self.seats.iter().filter(|seat| seat.is_assignable()).count()
        }
    }
}

pub mod result {
    use serde::{Deserialize, Serialize};
    use super::entity::Occupant;
    use super::room::Room;
    use crate::constraint::ConstraintLevel;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Statistics {
        pub total: usize,
        pub placed: usize,
        pub unplaced: usize,
        pub success_rate_percent: f64,
    }

    impl Statistics {
        pub fn new(placed: usize, unplaced: usize) -> Statistics {
            let total = placed + unplaced;
            // Nothing to seat counts as full success.
            let success_rate_percent = if total == 0 {
                100.0
            } else {
                placed as f64 / total as f64 * 100.0
            };
            Statistics { total, placed, unplaced, success_rate_percent }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AttemptSummary {
        pub attempt: usize,
        pub level: ConstraintLevel,
        pub placed: usize,
        pub unplaced: usize,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PlacementResult {
        pub rooms: Vec<Room>,
        pub unplaced_occupants: Vec<Occupant>,
        pub statistics: Statistics,
        #[serde(default)]
        pub attempts: Vec<AttemptSummary>,
        pub final_level: ConstraintLevel,
    }

    impl PlacementResult {
        pub fn seated(&self) -> impl Iterator<Item = (&Room, &Occupant)> {
            self.rooms.iter().flat_map(|room| {
                room.seats.iter().filter_map(move |seat| seat.occupant.as_ref().map(|occupant| (room, occupant)))
            })
        }

        pub fn refresh_statistics(&mut self) {
            let placed = self.seated().count();
            self.statistics = Statistics::new(placed, self.unplaced_occupants.len());
        }
    }
}
