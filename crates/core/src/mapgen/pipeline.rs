//! End-to-end generation: layout, denoise, connect, border, graph, analyze, place, export.

use std::path::Path;

use crate::config::GenerationConfig;
use crate::error::{GenerationError, SoftError};
use crate::graph::{MapGraph, MapProperties, NodeId, analyze, build_room_graph};
use crate::grid::Grid;
use crate::placement::{Footprints, PlacedResource, place_resources};
use crate::rng::MapRng;
use crate::types::{Coord, Tile};

use super::area::{Area, add_junction_dummies};
use super::connectivity::{ConnectivityBuilder, Passage};
use super::export::{export_grid, export_properties};
use super::regions::denoise;
use super::rooms::{Room, build_rooms};
use super::strategy::strategy_for;

/// Everything one generation run produced.
#[derive(Clone, Debug)]
pub struct GeneratedMap {
    pub seed: String,
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub passages: Vec<Passage>,
    /// Room, corridor and junction areas the graph was built from.
    pub areas: Vec<Area>,
    pub graph: MapGraph,
    /// Exact tiles of room nodes built from cave regions.
    pub footprints: Footprints,
    pub properties: MapProperties,
    pub placements: Vec<PlacedResource>,
    pub soft_errors: Vec<SoftError>,
    /// xxh3 of the final grid.
    pub fingerprint: u64,
}

pub fn generate(config: &GenerationConfig) -> Result<GeneratedMap, GenerationError> {
    let seed = config.resolved_seed();
    generate_with_seed(config, &seed)
}

/// Runs the pipeline for an explicit seed string, ignoring `auto_seed`.
pub fn generate_with_seed(
    config: &GenerationConfig,
    seed: &str,
) -> Result<GeneratedMap, GenerationError> {
    config.validate()?;
    let mut rng = MapRng::from_seed_str(seed);
    let strategy = strategy_for(&config.strategy, config.symbols);
    log::info!("generating {}x{} map from seed {seed:?}", config.width, config.height);

    let layout = strategy.generate(config.width, config.height, &mut rng)?;
    let mut grid = layout.grid;

    let regions = denoise(&mut grid, config.strategy.thresholds());
    if regions.is_empty() {
        return Err(GenerationError::NoRoomsSurvived);
    }
    let mut rooms = build_rooms(&grid, &regions);

    let passage_width = config.strategy.passage_width();
    let mut builder = ConnectivityBuilder::new(&mut grid, passage_width, strategy.passage_style());
    builder.connect_all(&mut rooms)?;
    builder.add_random_passages(&mut rooms, strategy.extra_passages(), &mut rng);
    let passages = builder.into_passages();

    apply_overrides(&mut grid, &layout.overrides);

    let shift = config.border as i32;
    let mut grid = grid.add_border(config.border, Tile::Wall);
    let rooms: Vec<Room> = rooms.iter().map(|room| room.shifted(shift, shift)).collect();
    let passages: Vec<Passage> =
        passages.iter().map(|passage| passage.shifted(shift, shift)).collect();

    let (mut areas, footprints) = structure_areas(&grid, &layout.areas, &rooms, shift);
    areas.extend(passages.iter().map(|passage| passage.area));
    add_junction_dummies(&mut areas);

    let mut graph = build_room_graph(&areas);
    let properties = analyze(&graph, &config.analysis);
    let outcome =
        place_resources(&mut grid, &mut graph, &footprints, &config.placement, &mut rng);
    let mut soft_errors = outcome.soft_errors;

    if let Some(directory) = &config.export.directory {
        export_outputs(&grid, &properties, config, directory, seed, &mut soft_errors);
    }

    let fingerprint = grid.fingerprint();
    log::info!(
        "seed {seed:?}: {} room(s), {} passage(s), {} resource(s), fingerprint {fingerprint:016x}",
        rooms.len(),
        passages.len(),
        outcome.placed.len()
    );

    Ok(GeneratedMap {
        seed: seed.to_string(),
        grid,
        rooms,
        passages,
        areas,
        graph,
        footprints,
        properties,
        placements: outcome.placed,
        soft_errors,
        fingerprint,
    })
}

/// Overrides land only on cells that are already open, so they never wall off a passage
/// or open a pocket outside the connected layout.
fn apply_overrides(grid: &mut Grid, overrides: &[(Coord, Tile)]) {
    for &(coord, tile) in overrides {
        if grid.in_range(coord) && grid.get(coord).is_open() {
            grid.set(coord, tile);
        } else {
            let (row, col) = (coord.row, coord.col);
            log::warn!("dropping {tile:?} override at ({row}, {col}): not an open cell");
        }
    }
}

/// Generator areas that still hold open tiles after denoising, or the bounds of every
/// room when the generator laid out none. Rooms standing in as bounding boxes carry their
/// exact tiles as footprints.
fn structure_areas(
    grid: &Grid,
    layout_areas: &[Area],
    rooms: &[Room],
    shift: i32,
) -> (Vec<Area>, Footprints) {
    let kept: Vec<Area> = layout_areas
        .iter()
        .map(|area| area.shifted(shift, shift))
        .filter(|area| area.coords().any(|coord| grid.get(coord).is_open()))
        .collect();
    if !kept.is_empty() {
        return (kept, Footprints::new());
    }

    let mut areas = Vec::with_capacity(rooms.len());
    let mut footprints = Footprints::new();
    for room in rooms {
        if let Some(bounds) = room.bounds() {
            footprints.insert(NodeId::Room(areas.len() as u32), room.tiles.clone());
            areas.push(bounds);
        }
    }
    (areas, footprints)
}

fn export_outputs(
    grid: &Grid,
    properties: &MapProperties,
    config: &GenerationConfig,
    directory: &Path,
    seed: &str,
    soft_errors: &mut Vec<SoftError>,
) {
    let mut skipped = |path: &Path, reason: String| {
        log::warn!("export to {} skipped: {reason}", path.display());
        soft_errors.push(SoftError::ExportSkipped { path: path.to_path_buf(), reason });
    };

    match export_grid(grid, &config.symbols, directory, seed) {
        Ok(path) => log::info!("wrote {}", path.display()),
        Err(error) => skipped(directory, error.to_string()),
    }
    if config.export.properties {
        match export_properties(properties, directory, seed) {
            Ok(path) => log::info!("wrote {}", path.display()),
            Err(error) => skipped(directory, error.to_string()),
        }
    }
}
