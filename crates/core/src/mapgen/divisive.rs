//! Recursive space partitioning: split the grid into leaves, then open a room inside
//! enough of them to reach the target fill.

use crate::config::DivisiveParams;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::rng::MapRng;
use crate::types::Tile;

use super::area::Area;
use super::connectivity::PassageStyle;
use super::strategy::{GenerationStrategy, Layout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    /// Cut with a vertical line, producing a left and a right half.
    Columns,
    /// Cut with a horizontal line, producing a top and a bottom half.
    Rows,
}

pub struct DivisiveGenerator {
    params: DivisiveParams,
}

impl DivisiveGenerator {
    pub fn new(params: DivisiveParams) -> Self {
        Self { params }
    }

    fn min_dim(&self) -> i32 {
        self.params.min_room_dim as i32
    }

    fn partition(&self, bounds: Area, rng: &mut MapRng) -> Vec<Area> {
        let mut leaves = Vec::new();
        self.split(bounds, 0, rng, &mut leaves);
        leaves
    }

    fn split(&self, area: Area, depth: usize, rng: &mut MapRng, leaves: &mut Vec<Area>) {
        let can_cut_columns = area.width() >= 2 * self.min_dim();
        let can_cut_rows = area.height() >= 2 * self.min_dim();
        if !can_cut_columns && !can_cut_rows {
            leaves.push(area);
            return;
        }

        let wants_split = depth < self.params.depth_floor
            || rng.percent_chance(self.params.split_percent);
        if !wants_split {
            leaves.push(area);
            return;
        }

        let preferred = if depth % 2 == 0 { Axis::Columns } else { Axis::Rows };
        let axis = match preferred {
            Axis::Columns if !can_cut_columns => Axis::Rows,
            Axis::Rows if !can_cut_rows => Axis::Columns,
            axis => axis,
        };

        let extent = match axis {
            Axis::Columns => area.width(),
            Axis::Rows => area.height(),
        };
        let cut = self.cut_offset(extent, rng);
        let (first, second) = match axis {
            Axis::Columns => (
                Area::new(area.left, area.top, area.left + cut - 1, area.bottom),
                Area::new(area.left + cut, area.top, area.right, area.bottom),
            ),
            Axis::Rows => (
                Area::new(area.left, area.top, area.right, area.top + cut - 1),
                Area::new(area.left, area.top + cut, area.right, area.bottom),
            ),
        };
        self.split(first, depth + 1, rng, leaves);
        self.split(second, depth + 1, rng, leaves);
    }

    /// Size of the first half, drawn from the divide bounds and clamped so both halves
    /// keep the minimum room dimension.
    fn cut_offset(&self, extent: i32, rng: &mut MapRng) -> i32 {
        let lower = self.params.divide_lower_percent;
        let upper = self.params.divide_upper_percent;
        let fraction = (lower + rng.unit_f64() * (upper - lower)) / 100.0;
        let cut = (f64::from(extent) * fraction).round() as i32;
        cut.clamp(self.min_dim(), extent - self.min_dim())
    }
}

impl GenerationStrategy for DivisiveGenerator {
    fn generate(
        &self,
        width: usize,
        height: usize,
        rng: &mut MapRng,
    ) -> Result<Layout, GenerationError> {
        let mut grid = Grid::new(width, height, Tile::Wall);
        let mut leaves = self.partition(Area::new(0, 0, width as i32 - 1, height as i32 - 1), rng);
        rng.shuffle(&mut leaves);

        let target = (grid.len() as f64 * self.params.target_fill_percent / 100.0).ceil() as usize;
        let mut filled = 0;
        let mut rooms = Vec::new();
        for leaf in &leaves {
            if filled >= target {
                break;
            }
            let Some(room) = leaf.shrunk(1) else {
                continue;
            };
            for coord in room.coords() {
                grid.set(coord, Tile::Floor);
            }
            filled += room.tile_count();
            rooms.push(room);
        }

        if rooms.is_empty() {
            return Err(GenerationError::NoRoomsSurvived);
        }
        log::debug!(
            "divisive: {} leaf area(s), {} room(s) opened, {filled}/{} tiles",
            leaves.len(),
            rooms.len(),
            grid.len()
        );
        Ok(Layout { grid, areas: rooms, overrides: Vec::new() })
    }

    fn passage_style(&self) -> PassageStyle {
        PassageStyle::Corridor
    }

    fn extra_passages(&self) -> usize {
        self.params.extra_passages
    }
}
