//! Random fill followed by neighbour-count smoothing.

use crate::config::CellularParams;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::rng::MapRng;
use crate::types::Tile;

use super::strategy::{GenerationStrategy, Layout};

pub struct CellularGenerator {
    params: CellularParams,
}

impl CellularGenerator {
    pub fn new(params: CellularParams) -> Self {
        Self { params }
    }

    fn random_fill(&self, width: usize, height: usize, rng: &mut MapRng) -> Grid {
        let mut grid = Grid::new(width, height, Tile::Floor);
        let fill = f64::from(self.params.fill_percent);
        for coord in grid.coords().collect::<Vec<_>>() {
            let on_border = coord.row == 0
                || coord.col == 0
                || coord.row as usize == height - 1
                || coord.col as usize == width - 1;
            if on_border || rng.percent_chance(fill) {
                grid.set(coord, Tile::Wall);
            }
        }
        grid
    }

    /// One pass reading only the previous state.
    fn smooth(&self, grid: &Grid) -> Grid {
        let mut next = grid.clone();
        for coord in grid.coords() {
            let walls = grid.wall_neighbor_count(coord);
            if walls > self.params.high_threshold {
                next.set(coord, Tile::Wall);
            } else if walls < self.params.low_threshold {
                next.set(coord, Tile::Floor);
            }
        }
        next
    }
}

impl GenerationStrategy for CellularGenerator {
    fn generate(
        &self,
        width: usize,
        height: usize,
        rng: &mut MapRng,
    ) -> Result<Layout, GenerationError> {
        let mut grid = self.random_fill(width, height, rng);
        for _ in 0..self.params.smoothing_iterations {
            grid = self.smooth(&grid);
        }
        log::debug!(
            "cellular: {}x{} grid, {} floor tile(s) after {} smoothing pass(es)",
            width,
            height,
            grid.count(Tile::Floor),
            self.params.smoothing_iterations
        );
        Ok(Layout::from_grid(grid))
    }
}
