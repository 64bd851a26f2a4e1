//! The seam between the pipeline and the interchangeable layout generators.

use crate::config::StrategyConfig;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::rng::MapRng;
use crate::types::{Coord, Symbols, Tile};

use super::area::Area;
use super::cellular::CellularGenerator;
use super::connectivity::PassageStyle;
use super::divisive::DivisiveGenerator;
use super::genome::GenomeGenerator;

/// Raw output of a generator, before denoising and connectivity.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub grid: Grid,
    /// Rectangles the generator laid out, empty for cave-like generators.
    pub areas: Vec<Area>,
    /// Cells rewritten after connectivity, so denoising never erases them.
    pub overrides: Vec<(Coord, Tile)>,
}

impl Layout {
    pub fn from_grid(grid: Grid) -> Self {
        Self { grid, areas: Vec::new(), overrides: Vec::new() }
    }
}

pub trait GenerationStrategy {
    fn generate(
        &self,
        width: usize,
        height: usize,
        rng: &mut MapRng,
    ) -> Result<Layout, GenerationError>;

    fn passage_style(&self) -> PassageStyle {
        PassageStyle::Line
    }

    /// Random passages added once every room reaches the main room.
    fn extra_passages(&self) -> usize {
        0
    }
}

pub fn strategy_for(config: &StrategyConfig, symbols: Symbols) -> Box<dyn GenerationStrategy> {
    match config {
        StrategyConfig::Cellular(params) => Box::new(CellularGenerator::new(params.clone())),
        StrategyConfig::Divisive(params) => Box::new(DivisiveGenerator::new(params.clone())),
        StrategyConfig::Genome(params) => Box::new(GenomeGenerator::new(params.clone(), symbols)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DivisiveParams, GenomeParams};

    #[test]
    fn each_strategy_reports_its_passage_style() {
        let cellular = strategy_for(&StrategyConfig::default(), Symbols::default());
        assert_eq!(cellular.passage_style(), PassageStyle::Line);
        assert_eq!(cellular.extra_passages(), 0);

        let params = DivisiveParams { extra_passages: 3, ..DivisiveParams::default() };
        let divisive = strategy_for(&StrategyConfig::Divisive(params), Symbols::default());
        assert_eq!(divisive.passage_style(), PassageStyle::Corridor);
        assert_eq!(divisive.extra_passages(), 3);

        let genome =
            strategy_for(&StrategyConfig::Genome(GenomeParams::default()), Symbols::default());
        assert_eq!(genome.passage_style(), PassageStyle::Corridor);
    }
}
