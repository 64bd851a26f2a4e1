//! Persistent room records promoted from surviving floor regions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::Coord;

use super::area::Area;
use super::regions::Region;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub tiles: BTreeSet<Coord>,
    /// Floor tiles with a wall in their 4-neighbourhood; passage endpoints are chosen from these.
    pub edge_tiles: BTreeSet<Coord>,
    pub size: usize,
    pub is_main_room: bool,
    pub is_accessible_from_main_room: bool,
    pub connected_rooms: BTreeSet<RoomId>,
}

impl Room {
    pub fn from_region(id: RoomId, region: &Region, grid: &Grid) -> Self {
        let tiles: BTreeSet<Coord> = region.coords.iter().copied().collect();
        let edge_tiles = tiles.iter().copied().filter(|&coord| grid.is_edge_tile(coord)).collect();
        Self {
            id,
            size: tiles.len(),
            tiles,
            edge_tiles,
            is_main_room: false,
            is_accessible_from_main_room: false,
            connected_rooms: BTreeSet::new(),
        }
    }

    pub fn is_connected(&self, other: RoomId) -> bool {
        self.connected_rooms.contains(&other)
    }

    pub fn bounds(&self) -> Option<Area> {
        Area::bounding(self.tiles.iter().copied())
    }

    pub fn shifted(&self, d_row: i32, d_col: i32) -> Room {
        let shift = |coord: &Coord| coord.offset(d_row, d_col);
        Room {
            tiles: self.tiles.iter().map(shift).collect(),
            edge_tiles: self.edge_tiles.iter().map(shift).collect(),
            connected_rooms: self.connected_rooms.clone(),
            ..*self
        }
    }
}

/// Promotes regions to rooms and flags the largest (first on ties) as the main room.
pub fn build_rooms(grid: &Grid, regions: &[Region]) -> Vec<Room> {
    let mut rooms: Vec<Room> = regions
        .iter()
        .enumerate()
        .map(|(index, region)| Room::from_region(RoomId(index as u32), region, grid))
        .collect();

    let mut main_index = None;
    for (index, room) in rooms.iter().enumerate() {
        if main_index.is_none_or(|best: usize| room.size > rooms[best].size) {
            main_index = Some(index);
        }
    }
    if let Some(index) = main_index {
        rooms[index].is_main_room = true;
        rooms[index].is_accessible_from_main_room = true;
    }
    rooms
}

pub fn link_rooms(rooms: &mut [Room], a: RoomId, b: RoomId) {
    if a == b {
        return;
    }
    rooms[a.0 as usize].connected_rooms.insert(b);
    rooms[b.0 as usize].connected_rooms.insert(a);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::regions::extract_regions;
    use crate::types::Tile;

    #[test]
    fn largest_region_becomes_main_room_with_edge_tiles() {
        let mut grid = Grid::new(10, 6, Tile::Wall);
        for row in 1..5 {
            for col in 1..4 {
                grid.set(Coord::new(row, col), Tile::Floor);
            }
            for col in 6..9 {
                if row < 3 {
                    grid.set(Coord::new(row, col), Tile::Floor);
                }
            }
        }
        let regions = extract_regions(&grid, Tile::Floor);
        let rooms = build_rooms(&grid, &regions);

        assert_eq!(rooms.len(), 2);
        assert!(rooms[0].is_main_room && rooms[0].is_accessible_from_main_room);
        assert!(!rooms[1].is_main_room);
        assert_eq!(rooms[0].size, 12);
        assert!(!rooms[0].edge_tiles.contains(&Coord::new(2, 2)), "interior tile is not an edge");
        assert!(rooms[0].edge_tiles.contains(&Coord::new(1, 1)));
    }

    #[test]
    fn linking_is_mutual_and_ignores_self_links() {
        let grid = Grid::new(4, 4, Tile::Floor);
        let region = Region { tile: Tile::Floor, coords: vec![Coord::new(1, 1)] };
        let mut rooms = vec![
            Room::from_region(RoomId(0), &region, &grid),
            Room::from_region(RoomId(1), &region, &grid),
        ];
        link_rooms(&mut rooms, RoomId(0), RoomId(1));
        link_rooms(&mut rooms, RoomId(1), RoomId(1));
        assert!(rooms[0].is_connected(RoomId(1)) && rooms[1].is_connected(RoomId(0)));
        assert!(!rooms[1].is_connected(RoomId(1)));
    }
}
