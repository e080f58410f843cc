use std::collections::HashMap;

use crate::config::{Adjacency, NeighborScope, Settings};
use crate::model::entity::{Id, Index};
use crate::model::room::{Room, Seat, SeatKind};
use crate::numbering::{desk_numbers, desk_order};

/// Layout facts of one room that every attempt reuses.
#[derive(Debug, Clone)]
pub struct RoomLayout {
    pub room_id: Id,
    /// Seat indices in desk order.
    pub order: Vec<Index>,
    /// Desk number per seat index.
    pub numbers: Vec<usize>,
    /// Neighbor seat indices per seat index.
    pub neighbors: Vec<Vec<Index>>,
    pub assignable: Vec<bool>,
    pub accessible: Vec<bool>,
}

impl RoomLayout {
    pub fn create(room: &Room, adjacency: Adjacency, scope: NeighborScope) -> RoomLayout {
        let order = desk_order(&room.seats);
        let numbers = desk_numbers(&room.seats);
        let coords = grid_coordinates(room, scope);

        let mut by_coord: HashMap<(i64, i64), Vec<Index>> = HashMap::new();
        for (index, coord) in coords.iter().enumerate() {
            by_coord.entry(*coord).or_default().push(index);
        }

        let neighbors = coords.iter().enumerate().map(|(index, (row, column))| {
            let mut found: Vec<Index> = adjacency.offsets().iter()
                .filter_map(|(dr, dc)| by_coord.get(&(row + dr, column + dc)))
                .flatten()
                .copied()
                .filter(|other| *other != index)
                .collect();
            found.sort_unstable();
            found.dedup();
            found
        }).collect();

        RoomLayout {
            room_id: room.id,
            order,
            numbers,
            neighbors,
            assignable: room.seats.iter().map(|seat| seat.is_assignable()).collect(),
            accessible: room.seats.iter().map(|seat| seat.kind == SeatKind::Accessible).collect(),
        }
    }

    pub fn neighbors(&self, seat_index: Index) -> &[Index] {
        self.neighbors.get(seat_index).map(|n| n.as_slice()).unwrap_or(&[])
    }
}

/// Grid coordinates used for adjacency. Under `NeighborScope::Group` each
/// group gets its own row band so clusters never touch; under
/// `NeighborScope::Room` groups are laid out left to right in key order.
fn grid_coordinates(room: &Room, scope: NeighborScope) -> Vec<(i64, i64)> {
    let mut groups: Vec<u32> = room.seats.iter().map(|seat| seat.group).collect();
    groups.sort_unstable();
    groups.dedup();

    let extent = |group: u32, of: fn(&Seat) -> u32| -> i64 {
        room.seats.iter().filter(|seat| seat.group == group).map(|seat| of(seat) as i64 + 1).max().unwrap_or(0)
    };

    let mut offsets: HashMap<u32, (i64, i64)> = HashMap::new();
    let mut cursor = 0i64;
    for group in groups {
        match scope {
            NeighborScope::Group => {
                offsets.insert(group, (cursor, 0));
                // one empty row between bands keeps groups apart for any adjacency
                cursor += extent(group, |seat| seat.row) + 1;
            }
            NeighborScope::Room => {
                offsets.insert(group, (0, cursor));
                cursor += extent(group, |seat| seat.column);
            }
        }
    }

    room.seats.iter().map(|seat| {
        let (row_offset, column_offset) = offsets.get(&seat.group).copied().unwrap_or((0, 0));
        (seat.row as i64 + row_offset, seat.column as i64 + column_offset)
    }).collect()
}

/// Layouts of every room of a run, in input order.
#[derive(Debug, Clone)]
pub struct LayoutCache {
    pub rooms: Vec<RoomLayout>,
}

impl LayoutCache {
    pub fn create(rooms: &[Room], settings: &Settings) -> LayoutCache {
        let rooms = rooms.iter()
            .map(|room| RoomLayout::create(room, settings.adjacency, settings.neighbor_scope))
            .collect();
        LayoutCache { rooms }
    }

    pub fn seat_count(&self) -> usize {
        self.rooms.iter().map(|room| room.assignable.iter().filter(|a| **a).count()).sum()
    }
}
