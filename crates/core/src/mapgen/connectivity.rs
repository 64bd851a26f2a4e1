//! Passage carving that makes every room reachable from the main room.

use std::collections::{BTreeSet, VecDeque};
use std::mem;

use crate::error::GenerationError;
use crate::grid::Grid;
use crate::rng::MapRng;
use crate::types::{Coord, Tile};

use super::area::Area;
use super::rooms::{Room, RoomId, link_rooms};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassageStyle {
    /// Straight discretized line between the two edge tiles.
    Line,
    /// Axis-aligned L: along the start row, then along the end column.
    Corridor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    pub from: RoomId,
    pub to: RoomId,
    pub start: Coord,
    pub end: Coord,
    /// Bounding box of every carved tile, flagged as a corridor.
    pub area: Area,
}

impl Passage {
    pub fn shifted(&self, d_row: i32, d_col: i32) -> Passage {
        Passage {
            start: self.start.offset(d_row, d_col),
            end: self.end.offset(d_row, d_col),
            area: self.area.shifted(d_row, d_col),
            ..*self
        }
    }
}

struct Candidate {
    distance: i64,
    from: RoomId,
    to: RoomId,
    start: Coord,
    end: Coord,
}

pub struct ConnectivityBuilder<'a> {
    grid: &'a mut Grid,
    radius: i32,
    style: PassageStyle,
    passages: Vec<Passage>,
}

impl<'a> ConnectivityBuilder<'a> {
    pub fn new(grid: &'a mut Grid, passage_width: usize, style: PassageStyle) -> Self {
        Self { grid, radius: passage_width as i32, style, passages: Vec::new() }
    }

    /// Greedy nearest-neighbour pairing for isolated rooms, then nearest cross-partition bridges
    /// until every room is reachable from the main room.
    pub fn connect_all(&mut self, rooms: &mut [Room]) -> Result<(), GenerationError> {
        if rooms.is_empty() {
            return Err(GenerationError::EmptyRoomList);
        }

        for index in 0..rooms.len() {
            if !rooms[index].connected_rooms.is_empty() {
                continue;
            }
            let mut best: Option<Candidate> = None;
            for other in rooms.iter() {
                if other.id == rooms[index].id || rooms[index].is_connected(other.id) {
                    continue;
                }
                consider(&mut best, &rooms[index], other);
            }
            if let Some(candidate) = best {
                self.create_passage(rooms, &candidate);
            }
        }

        loop {
            update_accessibility(rooms);
            let (accessible, unreachable): (Vec<&Room>, Vec<&Room>) =
                rooms.iter().partition(|room| room.is_accessible_from_main_room);
            if unreachable.is_empty() {
                break;
            }

            let mut best: Option<Candidate> = None;
            for room in &unreachable {
                for target in &accessible {
                    consider(&mut best, room, target);
                }
            }
            let Some(candidate) = best else {
                return Err(GenerationError::Unconnectable { unreachable: unreachable.len() });
            };
            self.create_passage(rooms, &candidate);
        }

        log::debug!("connectivity: carved {} passage(s)", self.passages.len());
        Ok(())
    }

    /// Carves `count` additional passages between random room pairs to add cycles.
    pub fn add_random_passages(&mut self, rooms: &mut [Room], count: usize, rng: &mut MapRng) {
        if rooms.len() < 2 {
            return;
        }
        for _ in 0..count {
            let a = rng.range_usize(0, rooms.len() - 1);
            let mut b = rng.range_usize(0, rooms.len() - 2);
            if b >= a {
                b += 1;
            }
            let mut best = None;
            consider(&mut best, &rooms[a], &rooms[b]);
            if let Some(candidate) = best {
                self.create_passage(rooms, &candidate);
            }
        }
    }

    pub fn into_passages(self) -> Vec<Passage> {
        self.passages
    }

    fn create_passage(&mut self, rooms: &mut [Room], candidate: &Candidate) {
        link_rooms(rooms, candidate.from, candidate.to);
        let path = match self.style {
            PassageStyle::Line => line(candidate.start, candidate.end),
            PassageStyle::Corridor => elbow(candidate.start, candidate.end),
        };

        let mut carved = Vec::new();
        for point in path {
            self.stamp_circle(point, &mut carved);
        }
        let start = candidate.start;
        let area = Area::bounding(carved.iter().copied())
            .map(|bounds| Area { is_corridor: true, ..bounds })
            .unwrap_or_else(|| Area::corridor(start.col, start.row, start.col, start.row));

        self.passages.push(Passage {
            from: candidate.from,
            to: candidate.to,
            start: candidate.start,
            end: candidate.end,
            area,
        });
    }

    fn stamp_circle(&mut self, center: Coord, carved: &mut Vec<Coord>) {
        let radius = self.radius;
        for d_row in -radius..=radius {
            for d_col in -radius..=radius {
                if d_row * d_row + d_col * d_col > radius * radius {
                    continue;
                }
                let cell = center.offset(d_row, d_col);
                if !self.grid.in_range(cell) {
                    continue;
                }
                if self.grid.get(cell).is_wall() {
                    self.grid.set(cell, Tile::Floor);
                }
                carved.push(cell);
            }
        }
    }
}

/// Keeps the closest edge-tile pair between `a` and `b` if it beats the current best.
/// Ties keep the earlier candidate.
fn consider(best: &mut Option<Candidate>, a: &Room, b: &Room) {
    for &start in &a.edge_tiles {
        for &end in &b.edge_tiles {
            let distance = start.squared_distance(end);
            if best.as_ref().is_none_or(|current| distance < current.distance) {
                *best = Some(Candidate { distance, from: a.id, to: b.id, start, end });
            }
        }
    }
}

fn update_accessibility(rooms: &mut [Room]) {
    let mut reached = BTreeSet::new();
    let mut queue: VecDeque<RoomId> =
        rooms.iter().filter(|room| room.is_main_room).map(|room| room.id).collect();
    reached.extend(queue.iter().copied());
    while let Some(current) = queue.pop_front() {
        for &next in &rooms[current.0 as usize].connected_rooms {
            if reached.insert(next) {
                queue.push_back(next);
            }
        }
    }
    for room in rooms.iter_mut() {
        room.is_accessible_from_main_room = reached.contains(&room.id);
    }
}

/// Discretized line from `from` to `to`, both inclusive. Steps the major axis every iteration
/// and the minor axis whenever the accumulated error reaches the major delta.
pub fn line(from: Coord, to: Coord) -> Vec<Coord> {
    let mut col = from.col;
    let mut row = from.row;
    let d_col = to.col - from.col;
    let d_row = to.row - from.row;

    let mut inverted = false;
    let mut step = d_col.signum();
    let mut gradient_step = d_row.signum();
    let mut longest = d_col.abs();
    let mut shortest = d_row.abs();
    if longest < shortest {
        inverted = true;
        mem::swap(&mut longest, &mut shortest);
        step = d_row.signum();
        gradient_step = d_col.signum();
    }

    let mut points = Vec::with_capacity(longest as usize + 1);
    let mut gradient_accumulation = longest / 2;
    for _ in 0..longest {
        points.push(Coord { row, col });
        if inverted {
            row += step;
        } else {
            col += step;
        }
        gradient_accumulation += shortest;
        if gradient_accumulation >= longest {
            if inverted {
                col += gradient_step;
            } else {
                row += gradient_step;
            }
            gradient_accumulation -= longest;
        }
    }
    points.push(Coord { row, col });
    points
}

fn elbow(from: Coord, to: Coord) -> Vec<Coord> {
    let mut points = Vec::new();
    let col_step = (to.col - from.col).signum();
    let mut col = from.col;
    while col != to.col {
        points.push(Coord { row: from.row, col });
        col += col_step;
    }
    let row_step = (to.row - from.row).signum();
    let mut row = from.row;
    while row != to.row {
        points.push(Coord { row, col: to.col });
        row += row_step;
    }
    points.push(to);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::regions::extract_regions;
    use crate::mapgen::rooms::build_rooms;

    fn carve_rect(grid: &mut Grid, top: i32, left: i32, bottom: i32, right: i32) {
        for row in top..=bottom {
            for col in left..=right {
                grid.set(Coord::new(row, col), Tile::Floor);
            }
        }
    }

    fn is_four_connected(cells: &BTreeSet<Coord>, from: Coord, to: Coord) -> bool {
        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            for next in current.cross_neighbors() {
                if cells.contains(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    #[test]
    fn line_includes_both_endpoints_and_never_skips_the_major_axis() {
        let points = line(Coord::new(2, 2), Coord::new(5, 10));
        assert_eq!(points.first(), Some(&Coord::new(2, 2)));
        assert_eq!(points.last(), Some(&Coord::new(5, 10)));
        assert_eq!(points.len(), 9);
        for pair in points.windows(2) {
            assert!(pair[0].chebyshev(pair[1]) == 1, "consecutive points must touch: {pair:?}");
        }
    }

    #[test]
    fn passage_between_two_rooms_is_connected_and_mutual() {
        let mut grid = Grid::new(14, 6, Tile::Wall);
        carve_rect(&mut grid, 1, 0, 4, 1);
        carve_rect(&mut grid, 2, 2, 3, 2);
        carve_rect(&mut grid, 1, 10, 4, 11);
        let regions = extract_regions(&grid, Tile::Floor);
        let mut rooms = build_rooms(&grid, &regions);
        assert_eq!(rooms.len(), 2);
        assert_eq!((rooms[0].size, rooms[1].size), (10, 8));

        let mut builder = ConnectivityBuilder::new(&mut grid, 1, PassageStyle::Line);
        builder.connect_all(&mut rooms).expect("two rooms can always be connected");
        let passages = builder.into_passages();

        assert_eq!(passages.len(), 1);
        let passage = &passages[0];
        assert_eq!((passage.start, passage.end), (Coord::new(2, 2), Coord::new(2, 10)));

        let open: BTreeSet<Coord> = grid.open_coords().into_iter().collect();
        assert!(open.contains(&passage.start) && open.contains(&passage.end));
        assert!(is_four_connected(&open, passage.start, passage.end));
        assert!(rooms[0].is_connected(rooms[1].id));
        assert!(rooms[1].is_connected(rooms[0].id));
        assert!(rooms.iter().all(|room| room.is_accessible_from_main_room));
    }

    #[test]
    fn isolated_clusters_are_bridged_to_the_main_room() {
        let mut grid = Grid::new(30, 12, Tile::Wall);
        carve_rect(&mut grid, 1, 1, 3, 4);
        carve_rect(&mut grid, 1, 7, 3, 9);
        carve_rect(&mut grid, 8, 20, 10, 28);
        carve_rect(&mut grid, 8, 15, 10, 16);
        let regions = extract_regions(&grid, Tile::Floor);
        let mut rooms = build_rooms(&grid, &regions);

        ConnectivityBuilder::new(&mut grid, 1, PassageStyle::Corridor)
            .connect_all(&mut rooms)
            .expect("rooms should connect");

        let floors = extract_regions(&grid, Tile::Floor);
        assert_eq!(floors.len(), 1, "every floor tile must end up in one region");
        assert!(rooms.iter().all(|room| room.is_accessible_from_main_room));
    }

    #[test]
    fn empty_room_list_is_a_hard_error() {
        let mut grid = Grid::new(4, 4, Tile::Wall);
        let err = ConnectivityBuilder::new(&mut grid, 1, PassageStyle::Line)
            .connect_all(&mut [])
            .expect_err("no rooms cannot be connected");
        assert!(matches!(err, GenerationError::EmptyRoomList));
    }

    #[test]
    fn random_passages_link_distinct_rooms() {
        let mut grid = Grid::new(20, 8, Tile::Wall);
        carve_rect(&mut grid, 1, 1, 3, 3);
        carve_rect(&mut grid, 1, 8, 3, 10);
        carve_rect(&mut grid, 1, 15, 3, 17);
        let regions = extract_regions(&grid, Tile::Floor);
        let mut rooms = build_rooms(&grid, &regions);
        let mut rng = MapRng::from_seed_str("extra");

        let mut builder = ConnectivityBuilder::new(&mut grid, 1, PassageStyle::Corridor);
        builder.add_random_passages(&mut rooms, 4, &mut rng);
        let passages = builder.into_passages();

        assert_eq!(passages.len(), 4);
        assert!(passages.iter().all(|passage| passage.from != passage.to));
        assert!(passages.iter().all(|passage| passage.area.is_corridor));
    }
}
