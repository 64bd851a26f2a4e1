pub mod config;
pub mod error;
pub mod graph;
pub mod grid;
pub mod invariants;
pub mod mapgen;
pub mod placement;
pub mod rng;
pub mod types;

pub use config::GenerationConfig;
pub use error::{GenerationError, GenomeError, SoftError};
pub use graph::{MapGraph, MapProperties, NodeId};
pub use grid::Grid;
pub use mapgen::{GeneratedMap, Genome, generate, generate_with_seed};
pub use placement::PlacedResource;
pub use rng::MapRng;
pub use types::*;
