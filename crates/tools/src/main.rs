use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use arena_core::config::{DivisiveParams, GenomeParams, StrategyConfig};
use arena_core::graph::{analyze, build_room_graph, build_tile_graph};
use arena_core::mapgen::regions::extract_regions;
use arena_core::mapgen::rooms::build_rooms;
use arena_core::{GenerationConfig, Genome, Grid, MapGraph, Tile, generate};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a map and print it
    Generate {
        #[command(flatten)]
        map: MapArgs,
        /// Write `<seed>_map.txt` (and `<seed>_properties.json`) into this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the generation report as JSON instead of the grid
        #[arg(long)]
        json: bool,
    },
    /// Encode a generated map as an AB genome, or render a genome as a grid
    Genome {
        #[command(subcommand)]
        action: GenomeAction,
    },
    /// Compute graph metrics for a map text file
    Analyze {
        /// Map file in the `<seed>_map.txt` format
        map: PathBuf,
        /// Analyze the per-tile graph instead of the room graph
        #[arg(long)]
        tiles: bool,
    },
}

#[derive(Subcommand)]
enum GenomeAction {
    Encode {
        #[command(flatten)]
        map: MapArgs,
    },
    Render {
        genome: String,
        #[arg(long, default_value_t = 40)]
        width: usize,
        #[arg(long, default_value_t = 40)]
        height: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    Cellular,
    Divisive,
    Genome,
}

#[derive(Args)]
struct MapArgs {
    /// TOML configuration; command-line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    seed: Option<String>,
    /// Derive the seed from the wall clock
    #[arg(long)]
    auto_seed: bool,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,
}

impl MapArgs {
    fn resolve(&self) -> Result<GenerationConfig> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => GenerationConfig::default(),
        };
        if let Some(seed) = &self.seed {
            config.seed = seed.clone();
        }
        config.auto_seed |= self.auto_seed;
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(kind) = self.strategy {
            config.strategy = match kind {
                StrategyKind::Cellular => StrategyConfig::default(),
                StrategyKind::Divisive => StrategyConfig::Divisive(DivisiveParams::default()),
                StrategyKind::Genome => StrategyConfig::Genome(GenomeParams::default()),
            };
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate { map, out, json } => {
            let mut config = map.resolve()?;
            if let Some(directory) = out {
                config.export.directory = Some(directory);
                config.export.properties = true;
            }
            let generated = generate(&config).context("Generation failed")?;

            if json {
                let warnings: Vec<String> =
                    generated.soft_errors.iter().map(ToString::to_string).collect();
                let report = serde_json::json!({
                    "seed": generated.seed,
                    "fingerprint": format!("{:016x}", generated.fingerprint),
                    "properties": generated.properties,
                    "placements": generated.placements,
                    "soft_errors": warnings,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", generated.grid.to_text(&config.symbols));
                println!("Seed: {}", generated.seed);
                println!("Fingerprint: {:016x}", generated.fingerprint);
                for error in &generated.soft_errors {
                    println!("Warning: {error}");
                }
            }
        }
        Command::Genome { action: GenomeAction::Encode { map } } => {
            let config = map.resolve()?;
            let generated = generate(&config).context("Generation failed")?;
            let genome = Genome::from_grid(&generated.grid, &generated.areas, config.symbols);
            println!("{genome}");
        }
        Command::Genome { action: GenomeAction::Render { genome, width, height } } => {
            let symbols = GenerationConfig::default().symbols;
            let genome = Genome::parse(&genome).context("Failed to parse genome")?;
            print!("{}", genome.rasterize(width, height, symbols).to_text(&symbols));
        }
        Command::Analyze { map, tiles } => {
            let symbols = GenerationConfig::default().symbols;
            let text = fs::read_to_string(&map)
                .with_context(|| format!("Failed to read map file: {}", map.display()))?;
            let Some(grid) = Grid::from_text(&text, &symbols) else {
                bail!("Map file {} is empty or has ragged rows", map.display());
            };

            let graph = if tiles { build_tile_graph(&grid) } else { room_graph(&grid) };
            let properties = analyze(&graph, &GenerationConfig::default().analysis);
            println!("{}", serde_json::to_string_pretty(&properties)?);
        }
    }

    Ok(())
}

/// Rooms are the open regions of the map, with resources counted as floor.
fn room_graph(grid: &Grid) -> MapGraph {
    let mut floor = grid.clone();
    for coord in grid.open_coords() {
        floor.set(coord, Tile::Floor);
    }
    let regions = extract_regions(&floor, Tile::Floor);
    let rooms = build_rooms(&floor, &regions);
    let areas: Vec<_> = rooms.iter().filter_map(|room| room.bounds()).collect();
    build_room_graph(&areas)
}
