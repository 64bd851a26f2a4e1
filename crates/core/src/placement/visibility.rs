//! All-pairs line of sight between open tiles, normalized per map.

use crate::grid::Grid;
use crate::types::Coord;

const SLOPE_EPSILON: f64 = 1e-9;

/// Normalized visibility per open tile; walls have none.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityMap {
    width: usize,
    scores: Vec<Option<f64>>,
}

impl VisibilityMap {
    pub fn get(&self, coord: Coord) -> Option<f64> {
        if coord.row < 0 || coord.col < 0 || coord.col as usize >= self.width {
            return None;
        }
        self.scores.get(coord.row as usize * self.width + coord.col as usize).copied().flatten()
    }
}

/// Counts, for every open tile, how many other open tiles it can see, then min-max
/// normalizes the counts. Equal counts everywhere normalize to 1.
pub fn compute_visibility(grid: &Grid) -> VisibilityMap {
    let open = grid.open_coords();
    let mut counts = vec![0_u32; open.len()];
    for (i, &a) in open.iter().enumerate() {
        for (j, &b) in open.iter().enumerate().skip(i + 1) {
            if line_of_sight(grid, a, b) {
                counts[i] += 1;
                counts[j] += 1;
            }
        }
    }

    let min = counts.iter().copied().min().unwrap_or(0);
    let max = counts.iter().copied().max().unwrap_or(0);
    let mut scores = vec![None; grid.len()];
    for (&coord, &count) in open.iter().zip(&counts) {
        let score = if max == min { 1.0 } else { f64::from(count - min) / f64::from(max - min) };
        scores[coord.row as usize * grid.width() + coord.col as usize] = Some(score);
    }
    VisibilityMap { width: grid.width(), scores }
}

/// Walks the dominant axis between `a` and `b`. Each intermediate step checks the one or
/// two cells the exact line passes between; sight is blocked only when all of them are walls.
pub fn line_of_sight(grid: &Grid, a: Coord, b: Coord) -> bool {
    let d_row = b.row - a.row;
    let d_col = b.col - a.col;
    let rows_dominant = d_row.abs() >= d_col.abs();
    let (major, minor) = if rows_dominant { (d_row, d_col) } else { (d_col, d_row) };
    if major == 0 {
        return true;
    }

    let step = major.signum();
    let slope = f64::from(minor) / f64::from(major);
    for i in 1..major.abs() {
        let along = i * step;
        let exact = slope * f64::from(along);
        let floor = exact.floor();
        let candidates = if (exact - exact.round()).abs() < SLOPE_EPSILON {
            [exact.round() as i32, exact.round() as i32]
        } else {
            [floor as i32, floor as i32 + 1]
        };
        let blocked = candidates.iter().all(|&offset| {
            let cell = if rows_dominant {
                a.offset(along, offset)
            } else {
                a.offset(offset, along)
            };
            grid.get(cell).is_wall()
        });
        if blocked {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tile;

    #[test]
    fn a_wall_between_two_tiles_blocks_sight() {
        let mut grid = Grid::new(5, 1, Tile::Floor);
        assert!(line_of_sight(&grid, Coord::new(0, 0), Coord::new(0, 4)));
        grid.set(Coord::new(0, 2), Tile::Wall);
        assert!(!line_of_sight(&grid, Coord::new(0, 0), Coord::new(0, 4)));
    }

    #[test]
    fn a_single_open_candidate_keeps_sight() {
        // The line from (0,0) to (1,2) passes between (0,1) and (1,1).
        let mut grid = Grid::new(3, 2, Tile::Floor);
        grid.set(Coord::new(0, 1), Tile::Wall);
        assert!(line_of_sight(&grid, Coord::new(0, 0), Coord::new(1, 2)));
        grid.set(Coord::new(1, 1), Tile::Wall);
        assert!(!line_of_sight(&grid, Coord::new(0, 0), Coord::new(1, 2)));
    }

    #[test]
    fn scores_are_normalized_and_walls_have_none() {
        let mut grid = Grid::new(5, 3, Tile::Floor);
        grid.set(Coord::new(1, 2), Tile::Wall);
        grid.set(Coord::new(0, 2), Tile::Wall);
        let map = compute_visibility(&grid);

        assert_eq!(map.get(Coord::new(1, 2)), None);
        let scores: Vec<f64> = grid.open_coords().iter().filter_map(|&c| map.get(c)).collect();
        assert!(scores.iter().all(|score| (0.0..=1.0).contains(score)));
        assert!(scores.contains(&0.0) && scores.contains(&1.0));
    }

    #[test]
    fn uniform_visibility_normalizes_to_one() {
        let grid = Grid::new(3, 3, Tile::Floor);
        let map = compute_visibility(&grid);
        assert!(grid.coords().all(|coord| map.get(coord) == Some(1.0)));
    }
}
