//! Axis-aligned rectangles used by partitioning generators and the room graph.

use serde::{Deserialize, Serialize};

use crate::types::Coord;

/// Inclusive rectangle in grid coordinates (`left`/`right` are columns, `top`/`bottom` rows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub is_corridor: bool,
    pub is_dummy: bool,
}

impl Area {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom, is_corridor: false, is_dummy: false }
    }

    pub fn corridor(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { is_corridor: true, ..Self::new(left, top, right, bottom) }
    }

    pub fn dummy(at: Coord) -> Self {
        Self { is_dummy: true, ..Self::new(at.col, at.row, at.col, at.row) }
    }

    /// Smallest rectangle covering every coordinate, or `None` for an empty input.
    pub fn bounding<I: IntoIterator<Item = Coord>>(coords: I) -> Option<Self> {
        let mut bounds: Option<Area> = None;
        for coord in coords {
            bounds = Some(match bounds {
                None => Area::new(coord.col, coord.row, coord.col, coord.row),
                Some(area) => Area {
                    left: area.left.min(coord.col),
                    top: area.top.min(coord.row),
                    right: area.right.max(coord.col),
                    bottom: area.bottom.max(coord.row),
                    ..area
                },
            });
        }
        bounds
    }

    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }

    pub fn tile_count(&self) -> usize {
        (self.width().max(0) as usize) * (self.height().max(0) as usize)
    }

    pub fn is_genuine_room(&self) -> bool {
        !self.is_corridor && !self.is_dummy
    }

    /// Geometric center as `(row, col)`.
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.top + self.bottom) / 2.0,
            f64::from(self.left + self.right) / 2.0,
        )
    }

    pub fn center_distance(&self, other: &Area) -> f64 {
        let (row_a, col_a) = self.center();
        let (row_b, col_b) = other.center();
        ((row_a - row_b).powi(2) + (col_a - col_b).powi(2)).sqrt()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.col >= self.left
            && coord.col <= self.right
            && coord.row >= self.top
            && coord.row <= self.bottom
    }

    /// Overlapping on one axis and overlapping or adjacent on the other.
    pub fn overlaps_or_touches(&self, other: &Area) -> bool {
        let cols_overlap = self.left <= other.right && other.left <= self.right;
        let rows_overlap = self.top <= other.bottom && other.top <= self.bottom;
        let cols_touch = self.left <= other.right + 1 && other.left <= self.right + 1;
        let rows_touch = self.top <= other.bottom + 1 && other.top <= self.bottom + 1;
        (cols_overlap && rows_touch) || (rows_overlap && cols_touch)
    }

    pub fn intersection(&self, other: &Area) -> Option<Area> {
        let area = Area::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (area.width() > 0 && area.height() > 0).then_some(area)
    }

    pub fn shrunk(&self, margin: i32) -> Option<Area> {
        let area = Area {
            left: self.left + margin,
            top: self.top + margin,
            right: self.right - margin,
            bottom: self.bottom - margin,
            ..*self
        };
        (area.width() > 0 && area.height() > 0).then_some(area)
    }

    pub fn shifted(&self, d_row: i32, d_col: i32) -> Area {
        Area {
            left: self.left + d_col,
            top: self.top + d_row,
            right: self.right + d_col,
            bottom: self.bottom + d_row,
            ..*self
        }
    }

    pub fn clipped(&self, width: usize, height: usize) -> Option<Area> {
        let bounds = Area::new(0, 0, width as i32 - 1, height as i32 - 1);
        self.intersection(&bounds)
            .map(|area| Area { is_corridor: self.is_corridor, is_dummy: self.is_dummy, ..area })
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (self.top..=self.bottom)
            .flat_map(move |row| (self.left..=self.right).map(move |col| Coord { row, col }))
    }
}

/// Adds a 1x1 dummy area wherever two corridors overlap or touch, so corridor junctions
/// survive the corridor-to-corridor skip rule of the graph builder.
pub fn add_junction_dummies(areas: &mut Vec<Area>) {
    let corridors: Vec<Area> = areas.iter().copied().filter(|area| area.is_corridor).collect();
    let mut dummies = Vec::new();
    for (index, a) in corridors.iter().enumerate() {
        for b in &corridors[index + 1..] {
            if !a.overlaps_or_touches(b) {
                continue;
            }
            let junction = match a.intersection(b) {
                Some(shared) => Coord { row: shared.top, col: shared.left },
                None => touching_cell(a, b),
            };
            if !dummies.iter().any(|dummy: &Area| dummy.contains(junction)) {
                dummies.push(Area::dummy(junction));
            }
        }
    }
    areas.extend(dummies);
}

/// First cell of `a` adjacent to `b` when the two only share a side.
fn touching_cell(a: &Area, b: &Area) -> Coord {
    let expanded = Area::new(b.left - 1, b.top - 1, b.right + 1, b.bottom + 1);
    a.coords()
        .find(|&coord| {
            expanded.contains(coord)
                && coord.cross_neighbors().into_iter().any(|next| b.contains(next))
        })
        .unwrap_or(Coord { row: a.top, col: a.left })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_requires_a_shared_side() {
        let room = Area::new(0, 0, 3, 3);
        assert!(room.overlaps_or_touches(&Area::new(4, 1, 6, 2)), "side contact counts");
        assert!(room.overlaps_or_touches(&Area::new(2, 2, 5, 5)), "overlap counts");
        assert!(!room.overlaps_or_touches(&Area::new(4, 4, 6, 6)), "corner contact does not");
        assert!(!room.overlaps_or_touches(&Area::new(5, 0, 6, 3)), "a gap does not");
    }

    #[test]
    fn bounding_covers_every_coordinate() {
        let area = Area::bounding([Coord::new(4, 2), Coord::new(1, 7), Coord::new(3, 3)])
            .expect("non-empty input has bounds");
        assert_eq!((area.left, area.top, area.right, area.bottom), (2, 1, 7, 4));
        assert!(Area::bounding(Vec::new()).is_none());
    }

    #[test]
    fn shrinking_a_thin_area_leaves_nothing() {
        assert!(Area::new(0, 0, 1, 5).shrunk(1).is_none());
        let inner = Area::new(0, 0, 4, 4).shrunk(1).expect("5x5 shrinks to 3x3");
        assert_eq!(inner.tile_count(), 9);
    }

    #[test]
    fn crossing_corridors_gain_a_junction_dummy() {
        let mut areas = vec![
            Area::corridor(0, 5, 10, 5),
            Area::corridor(4, 0, 4, 10),
            Area::new(20, 20, 22, 22),
        ];
        add_junction_dummies(&mut areas);
        let dummies: Vec<&Area> = areas.iter().filter(|area| area.is_dummy).collect();
        assert_eq!(dummies.len(), 1);
        assert!(dummies[0].contains(Coord::new(5, 4)));
    }
}
