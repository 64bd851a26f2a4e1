//! Structural properties every generated map satisfies, checked by the integration tests
//! and the `sweep` binary.

use std::collections::VecDeque;

use thiserror::Error;

use crate::config::RegionThresholds;
use crate::graph::NodeId;
use crate::grid::Grid;
use crate::mapgen::regions::extract_regions;
use crate::mapgen::{GeneratedMap, RoomId};
use crate::types::{Coord, Tile};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("open tiles form {components} separate component(s)")]
    Disconnected { components: usize },

    #[error("border breached at ({}, {})", .at.row, .at.col)]
    BorderBreached { at: Coord },

    #[error("room {0:?} is unreachable from the main room")]
    UnreachableRoom(RoomId),

    #[error("edge {a:?} -> {b:?} is asymmetric or negative ({weight})")]
    BadEdge { a: NodeId, b: NodeId, weight: f64 },

    #[error("resource '{symbol}' at ({}, {}) is missing from the grid", .at.row, .at.col)]
    UnstampedResource { symbol: char, at: Coord },

    #[error("resource '{symbol}' at ({}, {}) lies outside room {room:?}", .at.row, .at.col)]
    ResourceOutsideRoom { symbol: char, at: Coord, room: NodeId },

    #[error("fingerprint does not match the grid")]
    FingerprintMismatch,
}

/// Number of 4-connected components of open tiles, resources included.
pub fn open_components(grid: &Grid) -> usize {
    let mut seen = vec![false; grid.len()];
    let index = |coord: Coord| coord.row as usize * grid.width() + coord.col as usize;
    let mut components = 0;

    for start in grid.coords() {
        if seen[index(start)] || grid.get(start).is_wall() {
            continue;
        }
        components += 1;
        seen[index(start)] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in current.cross_neighbors() {
                if grid.in_range(next) && !seen[index(next)] && grid.get(next).is_open() {
                    seen[index(next)] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    components
}

/// First non-wall cell inside the outer `thickness` rings, if any.
pub fn border_breach(grid: &Grid, thickness: usize) -> Option<Coord> {
    let t = thickness as i32;
    let (height, width) = (grid.height() as i32, grid.width() as i32);
    grid.coords().find(|&coord| {
        let inside = coord.row >= t
            && coord.col >= t
            && coord.row < height - t
            && coord.col < width - t;
        !inside && grid.get(coord) != Tile::Wall
    })
}

/// Regions a denoising pass with `thresholds` would still erase.
pub fn regions_below(grid: &Grid, thresholds: RegionThresholds) -> usize {
    let walls = extract_regions(grid, Tile::Wall)
        .iter()
        .filter(|region| region.len() < thresholds.wall)
        .count();
    let floors = extract_regions(grid, Tile::Floor)
        .iter()
        .filter(|region| region.len() < thresholds.room)
        .count();
    walls + floors
}

pub fn check_map(map: &GeneratedMap, border: usize) -> Vec<Violation> {
    let mut found = Vec::new();

    let components = open_components(&map.grid);
    if components > 1 {
        found.push(Violation::Disconnected { components });
    }
    if let Some(at) = border_breach(&map.grid, border) {
        found.push(Violation::BorderBreached { at });
    }
    for room in map.rooms.iter().filter(|room| !room.is_accessible_from_main_room) {
        found.push(Violation::UnreachableRoom(room.id));
    }
    for (a, b, weight) in map.graph.edges() {
        if a == b || weight < 0.0 || map.graph.weight(b, a) != Some(weight) {
            found.push(Violation::BadEdge { a, b, weight });
        }
    }

    for placed in &map.placements {
        let (symbol, at) = (placed.symbol, placed.coord);
        if map.grid.get(at) != Tile::Resource(symbol) {
            found.push(Violation::UnstampedResource { symbol, at });
        }
        let inside = match map.footprints.get(&placed.room) {
            Some(tiles) => tiles.contains(&at),
            None => map
                .graph
                .node(placed.room)
                .and_then(|node| node.bounds())
                .is_some_and(|bounds| bounds.contains(at)),
        };
        if !inside {
            found.push(Violation::ResourceOutsideRoom { symbol, at, room: placed.room });
        }
    }

    if map.fingerprint != map.grid.fingerprint() {
        found.push(Violation::FingerprintMismatch);
    }
    found
}
