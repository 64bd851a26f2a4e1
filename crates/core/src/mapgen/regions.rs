//! Flood-fill region labelling and the threshold-based denoising pass.

use std::collections::VecDeque;

use crate::config::RegionThresholds;
use crate::grid::Grid;
use crate::types::{Coord, Tile};

/// Cells of one exact tile symbol, connected through the 4-neighbourhood, in discovery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub tile: Tile,
    pub coords: Vec<Coord>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Labels every region whose tiles share the general type of `kind` (wall vs non-wall),
/// scanning in raster order. Diagonal cells never join a region.
pub fn extract_regions(grid: &Grid, kind: Tile) -> Vec<Region> {
    let mut visited = vec![false; grid.len()];
    let mut regions = Vec::new();
    let index = |coord: Coord| (coord.row as usize) * grid.width() + (coord.col as usize);

    for start in grid.coords() {
        if visited[index(start)] || !grid.get(start).same_general_type(kind) {
            continue;
        }
        let tile = grid.get(start);
        let mut coords = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[index(start)] = true;

        while let Some(current) = queue.pop_front() {
            coords.push(current);
            for next in current.cross_neighbors() {
                if grid.in_range(next) && !visited[index(next)] && grid.get(next) == tile {
                    visited[index(next)] = true;
                    queue.push_back(next);
                }
            }
        }
        regions.push(Region { tile, coords });
    }

    regions
}

/// Erases wall specks below `thresholds.wall` and floor pockets below `thresholds.room`,
/// then returns the floor regions that survive, which become rooms.
pub fn denoise(grid: &mut Grid, thresholds: RegionThresholds) -> Vec<Region> {
    let mut erased_walls = 0;
    for region in extract_regions(grid, Tile::Wall) {
        if region.len() < thresholds.wall {
            erased_walls += region.len();
            for &coord in &region.coords {
                grid.set(coord, Tile::Floor);
            }
        }
    }

    let mut erased_floor = 0;
    let mut survivors = Vec::new();
    for region in extract_regions(grid, Tile::Floor) {
        if region.len() < thresholds.room {
            erased_floor += region.len();
            for &coord in &region.coords {
                grid.set(coord, Tile::Wall);
            }
        } else {
            survivors.push(region);
        }
    }

    log::debug!(
        "denoise: {erased_walls} wall tile(s) opened, {erased_floor} floor tile(s) filled, \
         {} room region(s)",
        survivors.len()
    );
    survivors
}
