//! Compact textual layouts ("AB notation"): square arenas, straight corridors and
//! single-tile object overrides.
//!
//! ```text
//! <x,y,dim><x,y,dim>...|<x,y,len>...|<x,y,symbol>...
//! ```
//!
//! `x` is the column and `y` the row of the top-left cell. A positive corridor length runs
//! right along the row, a negative one runs down the column.

use std::fmt;
use std::ops::RangeInclusive;

use crate::config::GenomeParams;
use crate::error::{GenerationError, GenomeError};
use crate::grid::Grid;
use crate::rng::MapRng;
use crate::types::{Coord, Symbols, Tile};

use super::area::Area;
use super::connectivity::PassageStyle;
use super::strategy::{GenerationStrategy, Layout};

/// Largest coordinate, arena side or corridor length a parsed genome may carry.
pub const MAX_EXTENT: i32 = 1 << 16;

const POSITION: RangeInclusive<i32> = 0..=MAX_EXTENT;
const ARENA_DIM: RangeInclusive<i32> = 1..=MAX_EXTENT;
const CORRIDOR_LEN: RangeInclusive<i32> = -MAX_EXTENT..=MAX_EXTENT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaGene {
    pub x: i32,
    pub y: i32,
    pub dim: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorridorGene {
    pub x: i32,
    pub y: i32,
    pub len: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectGene {
    pub x: i32,
    pub y: i32,
    pub symbol: char,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Genome {
    pub arenas: Vec<ArenaGene>,
    pub corridors: Vec<CorridorGene>,
    pub objects: Vec<ObjectGene>,
}

impl ArenaGene {
    pub fn area(&self) -> Area {
        let reach = self.dim.saturating_sub(1);
        Area::new(self.x, self.y, self.x.saturating_add(reach), self.y.saturating_add(reach))
    }
}

impl CorridorGene {
    /// `None` for a zero-length corridor.
    pub fn area(&self) -> Option<Area> {
        if self.len == 0 {
            return None;
        }
        let reach = i32::try_from(self.len.unsigned_abs() - 1).unwrap_or(i32::MAX);
        if self.len > 0 {
            Some(Area::corridor(self.x, self.y, self.x.saturating_add(reach), self.y))
        } else {
            Some(Area::corridor(self.x, self.y, self.x, self.y.saturating_add(reach)))
        }
    }
}

impl Genome {
    pub fn parse(text: &str) -> Result<Genome, GenomeError> {
        let mut parser = Parser { text: text.trim(), position: 0 };
        let mut genome = Genome::default();

        while parser.peek() == Some('<') {
            let [x, y, dim] = parser.numeric_tuple(ARENA_DIM)?;
            genome.arenas.push(ArenaGene { x, y, dim });
        }
        if parser.peek() == Some('|') {
            parser.position += 1;
            while parser.peek() == Some('<') {
                let [x, y, len] = parser.numeric_tuple(CORRIDOR_LEN)?;
                genome.corridors.push(CorridorGene { x, y, len });
            }
        }
        if parser.peek() == Some('|') {
            parser.position += 1;
            while parser.peek() == Some('<') {
                genome.objects.push(parser.object_tuple()?);
            }
        }
        if parser.peek().is_some() {
            return Err(GenomeError::TrailingInput { position: parser.position });
        }
        Ok(genome)
    }

    /// Random arenas inside the grid, with corridors leaving from arena centers.
    pub fn random(params: &GenomeParams, width: usize, height: usize, rng: &mut MapRng) -> Genome {
        let mut genome = Genome::default();
        let fit = width.min(height).saturating_sub(2).max(1);
        for _ in 0..params.arena_count {
            let dim =
                rng.range_usize(params.min_arena_dim, params.max_arena_dim).clamp(1, fit) as i32;
            let x = rng.range_i32(1, (width as i32 - 1 - dim).max(1));
            let y = rng.range_i32(1, (height as i32 - 1 - dim).max(1));
            genome.arenas.push(ArenaGene { x, y, dim });
        }

        if genome.arenas.is_empty() || params.max_corridor_len == 0 {
            return genome;
        }
        for _ in 0..params.corridor_count {
            let arena = genome.arenas[rng.range_usize(0, genome.arenas.len() - 1)];
            let x = arena.x + arena.dim / 2;
            let y = arena.y + arena.dim / 2;
            let len = rng.range_i32(1, params.max_corridor_len as i32);
            let corridor = if rng.percent_chance(50.0) {
                CorridorGene { x, y, len: -len.min(height as i32 - 1 - y).max(1) }
            } else {
                CorridorGene { x, y, len: len.min(width as i32 - 1 - x).max(1) }
            };
            genome.corridors.push(corridor);
        }
        genome
    }

    /// Encodes a finished layout so that `rasterize` reproduces `grid` exactly: room areas
    /// become squares, corridor areas become runs, every remaining difference an object.
    pub fn from_grid(grid: &Grid, areas: &[Area], symbols: Symbols) -> Genome {
        let mut genome = Genome::default();
        for area in areas.iter().filter_map(|area| area.clipped(grid.width(), grid.height())) {
            if area.is_dummy {
                continue;
            }
            if area.is_corridor {
                genome.corridors.extend(corridor_runs(&area));
            } else {
                genome.arenas.extend(square_cover(&area));
            }
        }

        let skeleton = genome.rasterize_structure(grid.width(), grid.height());
        for coord in grid.coords() {
            let tile = grid.get(coord);
            if skeleton.get(coord) != tile {
                genome.objects.push(ObjectGene {
                    x: coord.col,
                    y: coord.row,
                    symbol: symbols.char_for(tile),
                });
            }
        }
        genome
    }

    pub fn rasterize(&self, width: usize, height: usize, symbols: Symbols) -> Grid {
        let mut grid = self.rasterize_structure(width, height);
        for object in &self.objects {
            grid.set(object.coord(), symbols.tile_for(object.symbol));
        }
        grid
    }

    /// Arenas and corridors only; objects are left to the caller.
    fn rasterize_structure(&self, width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(width, height, Tile::Wall);
        for area in self.areas().iter().filter_map(|area| area.clipped(width, height)) {
            for coord in area.coords() {
                grid.set(coord, Tile::Floor);
            }
        }
        grid
    }

    pub fn areas(&self) -> Vec<Area> {
        self.arenas
            .iter()
            .map(ArenaGene::area)
            .chain(self.corridors.iter().filter_map(CorridorGene::area))
            .collect()
    }
}

impl ObjectGene {
    pub fn coord(&self) -> Coord {
        Coord::new(self.y, self.x)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arena in &self.arenas {
            write!(f, "<{},{},{}>", arena.x, arena.y, arena.dim)?;
        }
        if !self.corridors.is_empty() || !self.objects.is_empty() {
            f.write_str("|")?;
            for corridor in &self.corridors {
                write!(f, "<{},{},{}>", corridor.x, corridor.y, corridor.len)?;
            }
        }
        if !self.objects.is_empty() {
            f.write_str("|")?;
            for object in &self.objects {
                write!(f, "<{},{},{}>", object.x, object.y, object.symbol)?;
            }
        }
        Ok(())
    }
}

/// Splits a rectangle into squares, largest first along its long side.
fn square_cover(area: &Area) -> Vec<ArenaGene> {
    let mut squares = Vec::new();
    let (mut left, mut top) = (area.left, area.top);
    let (mut width, mut height) = (area.width(), area.height());
    while width > 0 && height > 0 {
        if width >= height {
            squares.push(ArenaGene { x: left, y: top, dim: height });
            left += height;
            width -= height;
        } else {
            squares.push(ArenaGene { x: left, y: top, dim: width });
            top += width;
            height -= width;
        }
    }
    squares
}

fn corridor_runs(area: &Area) -> Vec<CorridorGene> {
    if area.width() >= area.height() {
        (area.top..=area.bottom)
            .map(|row| CorridorGene { x: area.left, y: row, len: area.width() })
            .collect()
    } else {
        (area.left..=area.right)
            .map(|col| CorridorGene { x: col, y: area.top, len: -area.height() })
            .collect()
    }
}

struct Parser<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn expect(&mut self, expected: char) -> Result<(), GenomeError> {
        match self.peek() {
            Some(found) if found == expected => {
                self.position += found.len_utf8();
                Ok(())
            }
            Some(found) => Err(GenomeError::Expected { expected, found, position: self.position }),
            None => Err(GenomeError::UnexpectedEnd { position: self.position }),
        }
    }

    /// Raw field text up to the next `,` or `>`, which is left unconsumed.
    fn field(&mut self) -> Result<(&'a str, usize), GenomeError> {
        let start = self.position;
        let text = self.text;
        let rest = &text[start..];
        let Some(length) = rest.find([',', '>']) else {
            return Err(GenomeError::UnexpectedEnd { position: self.text.len() });
        };
        self.position += length;
        Ok((&rest[..length], start))
    }

    fn number(&mut self, range: RangeInclusive<i32>) -> Result<i32, GenomeError> {
        let (text, position) = self.field()?;
        let value: i32 = text
            .parse()
            .map_err(|_| GenomeError::InvalidNumber { text: text.to_string(), position })?;
        if !range.contains(&value) {
            let (min, max) = range.into_inner();
            return Err(GenomeError::OutOfRange { value, min, max, position });
        }
        Ok(value)
    }

    /// `<x,y,n>` where `n` must lie in `extent`.
    fn numeric_tuple(&mut self, extent: RangeInclusive<i32>) -> Result<[i32; 3], GenomeError> {
        self.expect('<')?;
        let x = self.number(POSITION)?;
        self.expect(',')?;
        let y = self.number(POSITION)?;
        self.expect(',')?;
        let n = self.number(extent)?;
        self.expect('>')?;
        Ok([x, y, n])
    }

    fn object_tuple(&mut self) -> Result<ObjectGene, GenomeError> {
        self.expect('<')?;
        let x = self.number(POSITION)?;
        self.expect(',')?;
        let y = self.number(POSITION)?;
        self.expect(',')?;
        let (text, position) = self.field()?;
        let mut chars = text.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(symbol), None) => symbol,
            _ => return Err(GenomeError::InvalidSymbol { text: text.to_string(), position }),
        };
        self.expect('>')?;
        Ok(ObjectGene { x, y, symbol })
    }
}

/// Builds layouts from a configured genome, or a random one when none is given.
pub struct GenomeGenerator {
    params: GenomeParams,
    symbols: Symbols,
}

impl GenomeGenerator {
    pub fn new(params: GenomeParams, symbols: Symbols) -> Self {
        Self { params, symbols }
    }
}

impl GenerationStrategy for GenomeGenerator {
    fn generate(
        &self,
        width: usize,
        height: usize,
        rng: &mut MapRng,
    ) -> Result<Layout, GenerationError> {
        let genome = match &self.params.genome {
            Some(text) => Genome::parse(text)?,
            None => Genome::random(&self.params, width, height, rng),
        };
        log::debug!(
            "genome: {} arena(s), {} corridor(s), {} object(s)",
            genome.arenas.len(),
            genome.corridors.len(),
            genome.objects.len()
        );

        let mut grid = genome.rasterize_structure(width, height);
        let mut overrides = Vec::new();
        for object in &genome.objects {
            match self.symbols.tile_for(object.symbol) {
                resource @ Tile::Resource(_) => overrides.push((object.coord(), resource)),
                tile => grid.set(object.coord(), tile),
            }
        }
        let areas = genome.areas().iter().filter_map(|area| area.clipped(width, height)).collect();
        Ok(Layout { grid, areas, overrides })
    }

    fn passage_style(&self) -> PassageStyle {
        PassageStyle::Corridor
    }
}
