//! Row-major tile buffer shared by every generation stage.

use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Coord, Symbols, Tile};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize, tile: Tile) -> Self {
        Self { width, height, tiles: vec![tile; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_range(&self, coord: Coord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.height
            && (coord.col as usize) < self.width
    }

    /// Out-of-range cells read as walls.
    pub fn get(&self, coord: Coord) -> Tile {
        if !self.in_range(coord) {
            return Tile::Wall;
        }
        self.tiles[self.index(coord)]
    }

    pub fn set(&mut self, coord: Coord, tile: Tile) {
        if !self.in_range(coord) {
            return;
        }
        let idx = self.index(coord);
        self.tiles[idx] = tile;
    }

    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    pub fn same_general_type(&self, a: Coord, b: Coord) -> bool {
        self.get(a).same_general_type(self.get(b))
    }

    /// Returns a larger grid with this one centered inside a `thickness`-wide frame of `tile`.
    pub fn add_border(&self, thickness: usize, tile: Tile) -> Grid {
        let mut bordered =
            Grid::new(self.width + thickness * 2, self.height + thickness * 2, tile);
        let shift = thickness as i32;
        for coord in self.coords() {
            bordered.set(coord.offset(shift, shift), self.get(coord));
        }
        bordered
    }

    /// Row-major iteration over every cell.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).map(move |col| Coord { row: row as i32, col: col as i32 })
        })
    }

    pub fn open_coords(&self) -> Vec<Coord> {
        self.coords().filter(|&coord| self.get(coord).is_open()).collect()
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&candidate| candidate == tile).count()
    }

    /// Wall count in the 8-neighbourhood; out-of-range cells count as walls.
    pub fn wall_neighbor_count(&self, coord: Coord) -> usize {
        let mut count = 0;
        for d_row in -1..=1 {
            for d_col in -1..=1 {
                if d_row == 0 && d_col == 0 {
                    continue;
                }
                if self.get(coord.offset(d_row, d_col)).is_wall() {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn is_edge_tile(&self, coord: Coord) -> bool {
        self.get(coord).is_open()
            && coord
                .cross_neighbors()
                .into_iter()
                .any(|next| self.in_range(next) && self.get(next).is_wall())
    }

    pub fn to_text(&self, symbols: &Symbols) -> String {
        let mut text = String::with_capacity((self.width + 1) * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                text.push(symbols.char_for(self.tiles[row * self.width + col]));
            }
            text.push('\n');
        }
        text
    }

    /// Parses the text form written by `to_text`. `None` for empty input or ragged rows.
    pub fn from_text(text: &str, symbols: &Symbols) -> Option<Grid> {
        let rows: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
        let width = rows.first()?.chars().count();
        let mut tiles = Vec::with_capacity(width * rows.len());
        for row in &rows {
            if row.chars().count() != width {
                return None;
            }
            tiles.extend(row.chars().map(|symbol| symbols.tile_for(symbol)));
        }
        Some(Grid { width, height: rows.len(), tiles })
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.tiles.len() * 4);
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        for tile in &self.tiles {
            match tile {
                Tile::Wall => bytes.push(0),
                Tile::Floor => bytes.push(1),
                Tile::Resource(symbol) => {
                    bytes.push(2);
                    bytes.extend(u32::from(*symbol).to_le_bytes());
                }
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    fn index(&self, coord: Coord) -> usize {
        (coord.row as usize) * self.width + (coord.col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_as_wall_and_writes_are_ignored() {
        let mut grid = Grid::new(3, 2, Tile::Floor);
        assert_eq!(grid.get(Coord::new(-1, 0)), Tile::Wall);
        assert_eq!(grid.get(Coord::new(0, 3)), Tile::Wall);
        grid.set(Coord::new(5, 5), Tile::Wall);
        assert_eq!(grid.count(Tile::Floor), 6);
    }

    #[test]
    fn add_border_centers_the_original_grid() {
        let mut grid = Grid::new(2, 2, Tile::Floor);
        grid.set(Coord::new(0, 1), Tile::Resource('s'));
        let bordered = grid.add_border(2, Tile::Wall);

        assert_eq!((bordered.width(), bordered.height()), (6, 6));
        assert_eq!(bordered.get(Coord::new(2, 3)), Tile::Resource('s'));
        assert_eq!(bordered.get(Coord::new(3, 2)), Tile::Floor);
        assert_eq!(bordered.count(Tile::Wall), 32);
    }

    #[test]
    fn wall_neighbor_count_treats_outside_as_wall() {
        let grid = Grid::new(3, 3, Tile::Floor);
        assert_eq!(grid.wall_neighbor_count(Coord::new(0, 0)), 5);
        assert_eq!(grid.wall_neighbor_count(Coord::new(1, 1)), 0);
    }

    #[test]
    fn text_export_is_row_major_with_one_line_per_row() {
        let mut grid = Grid::new(3, 2, Tile::Wall);
        grid.set(Coord::new(1, 1), Tile::Floor);
        grid.set(Coord::new(1, 2), Tile::Resource('a'));
        assert_eq!(grid.to_text(&Symbols::default()), "www\nwra\n");
    }

    #[test]
    fn text_form_parses_back() {
        let symbols = Symbols::default();
        let grid = Grid::from_text("wwww\nwrsw\nwwww\n", &symbols).expect("rectangular text");
        assert_eq!((grid.width(), grid.height()), (4, 3));
        assert_eq!(grid.get(Coord::new(1, 2)), Tile::Resource('s'));
        assert_eq!(grid.to_text(&symbols), "wwww\nwrsw\nwwww\n");

        assert!(Grid::from_text("www\nww\n", &symbols).is_none(), "ragged rows");
        assert!(Grid::from_text("", &symbols).is_none());
    }

    #[test]
    fn fingerprint_tracks_tile_changes() {
        let mut grid = Grid::new(4, 4, Tile::Wall);
        let before = grid.fingerprint();
        grid.set(Coord::new(2, 2), Tile::Floor);
        assert_ne!(before, grid.fingerprint());
    }
}
