//! Scoring terms shared by room and tile selection.

use std::collections::VecDeque;

use crate::config::VisibilityPreference;
use crate::grid::Grid;
use crate::types::Coord;

/// Distance from `value` to the closed band `[low, high]`; zero inside it.
pub fn band_distance(value: f64, low: f64, high: f64) -> f64 {
    if value < low {
        low - value
    } else if value > high {
        value - high
    } else {
        0.0
    }
}

pub fn visibility_fitness(preference: VisibilityPreference, visibility: f64) -> f64 {
    match preference {
        VisibilityPreference::Low => 1.0 - visibility,
        VisibilityPreference::High => visibility,
        VisibilityPreference::Neutral => 1.0 - (visibility - 0.5).abs() * 2.0,
    }
}

/// Min-max rescaling to `[0, 1]`; equal inputs all map to 1.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .map(|&value| if max - min <= f64::EPSILON { 1.0 } else { (value - min) / (max - min) })
        .collect()
}

/// Chebyshev distance from every cell to the nearest wall, treating the outside of the
/// grid as wall. Indexed row-major.
pub fn wall_distances(grid: &Grid) -> Vec<u32> {
    let width = grid.width();
    let height = grid.height();
    let index = |coord: Coord| coord.row as usize * width + coord.col as usize;
    let mut distances = vec![u32::MAX; grid.len()];
    let mut queue = VecDeque::new();
    for coord in grid.coords() {
        if grid.get(coord).is_wall() {
            distances[index(coord)] = 0;
            queue.push_back(coord);
        }
    }

    while let Some(current) = queue.pop_front() {
        let next_distance = distances[index(current)] + 1;
        for d_row in -1..=1 {
            for d_col in -1..=1 {
                let next = current.offset(d_row, d_col);
                if grid.in_range(next) && distances[index(next)] > next_distance {
                    distances[index(next)] = next_distance;
                    queue.push_back(next);
                }
            }
        }
    }

    for coord in grid.coords() {
        let to_edge = (coord.row + 1)
            .min(coord.col + 1)
            .min(height as i32 - coord.row)
            .min(width as i32 - coord.col) as u32;
        let slot = &mut distances[index(coord)];
        *slot = (*slot).min(to_edge);
    }
    distances
}
