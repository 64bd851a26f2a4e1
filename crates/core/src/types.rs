use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn squared_distance(self, other: Coord) -> i64 {
        let dr = i64::from(self.row - other.row);
        let dc = i64::from(self.col - other.col);
        dr * dr + dc * dc
    }

    pub fn distance(self, other: Coord) -> f64 {
        (self.squared_distance(other) as f64).sqrt()
    }

    pub fn chebyshev(self, other: Coord) -> u32 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Coord {
        Coord { row: self.row + d_row, col: self.col + d_col }
    }

    pub fn cross_neighbors(self) -> [Coord; 4] {
        [self.offset(-1, 0), self.offset(0, 1), self.offset(1, 0), self.offset(0, -1)]
    }
}

/// Tile alphabet. Resource tiles carry the symbol of their category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tile {
    Wall,
    Floor,
    Resource(char),
}

impl Tile {
    pub fn is_wall(self) -> bool {
        self == Tile::Wall
    }

    pub fn is_open(self) -> bool {
        !self.is_wall()
    }

    /// Walls form one general type, every other tile the other.
    pub fn same_general_type(self, other: Tile) -> bool {
        self.is_wall() == other.is_wall()
    }
}

/// Characters used when a grid is written out as text or encoded in a genome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Symbols {
    pub wall: char,
    pub floor: char,
}

impl Default for Symbols {
    fn default() -> Self {
        Self { wall: 'w', floor: 'r' }
    }
}

impl Symbols {
    pub fn char_for(&self, tile: Tile) -> char {
        match tile {
            Tile::Wall => self.wall,
            Tile::Floor => self.floor,
            Tile::Resource(symbol) => symbol,
        }
    }

    pub fn tile_for(&self, symbol: char) -> Tile {
        if symbol == self.wall {
            Tile::Wall
        } else if symbol == self.floor {
            Tile::Floor
        } else {
            Tile::Resource(symbol)
        }
    }
}
