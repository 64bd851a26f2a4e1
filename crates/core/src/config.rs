//! Generation parameters, loadable from TOML. Every section has defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::rng::runtime_seed_string;
use crate::types::Symbols;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub seed: String,
    /// Ignore `seed` and derive one from the wall clock.
    pub auto_seed: bool,
    pub width: usize,
    pub height: usize,
    pub border: usize,
    pub symbols: Symbols,
    pub strategy: StrategyConfig,
    pub analysis: AnalysisConfig,
    pub placement: PlacementConfig,
    pub export: ExportConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: "arena".to_string(),
            auto_seed: false,
            width: 40,
            height: 40,
            border: 1,
            symbols: Symbols::default(),
            strategy: StrategyConfig::default(),
            analysis: AnalysisConfig::default(),
            placement: PlacementConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    Cellular(CellularParams),
    Divisive(DivisiveParams),
    Genome(GenomeParams),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::Cellular(CellularParams::default())
    }
}

impl StrategyConfig {
    pub fn thresholds(&self) -> RegionThresholds {
        match self {
            StrategyConfig::Cellular(params) => params.thresholds,
            StrategyConfig::Divisive(params) => params.thresholds,
            StrategyConfig::Genome(params) => params.thresholds,
        }
    }

    pub fn passage_width(&self) -> usize {
        match self {
            StrategyConfig::Cellular(params) => params.passage_width,
            StrategyConfig::Divisive(params) => params.passage_width,
            StrategyConfig::Genome(params) => params.passage_width,
        }
    }
}

/// Regions below these sizes are erased during denoising.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionThresholds {
    pub wall: usize,
    pub room: usize,
}

impl Default for RegionThresholds {
    fn default() -> Self {
        Self { wall: 5, room: 10 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularParams {
    pub fill_percent: u32,
    pub smoothing_iterations: u32,
    pub high_threshold: usize,
    pub low_threshold: usize,
    pub thresholds: RegionThresholds,
    pub passage_width: usize,
}

impl Default for CellularParams {
    fn default() -> Self {
        Self {
            fill_percent: 45,
            smoothing_iterations: 3,
            high_threshold: 4,
            low_threshold: 4,
            thresholds: RegionThresholds::default(),
            passage_width: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivisiveParams {
    /// Percent chance that an area keeps splitting once the depth floor is passed.
    pub split_percent: f64,
    /// Stop keeping rooms once this share of the grid is floor.
    pub target_fill_percent: f64,
    pub min_room_dim: usize,
    pub depth_floor: usize,
    pub divide_lower_percent: f64,
    pub divide_upper_percent: f64,
    pub passage_width: usize,
    pub extra_passages: usize,
    pub thresholds: RegionThresholds,
}

impl Default for DivisiveParams {
    fn default() -> Self {
        Self {
            split_percent: 75.0,
            target_fill_percent: 35.0,
            min_room_dim: 5,
            depth_floor: 2,
            divide_lower_percent: 35.0,
            divide_upper_percent: 65.0,
            passage_width: 1,
            extra_passages: 2,
            thresholds: RegionThresholds { wall: 3, room: 4 },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeParams {
    /// AB-notation genome. A random genome is drawn when absent.
    pub genome: Option<String>,
    pub arena_count: usize,
    pub corridor_count: usize,
    pub min_arena_dim: usize,
    pub max_arena_dim: usize,
    pub max_corridor_len: usize,
    pub passage_width: usize,
    pub thresholds: RegionThresholds,
}

impl Default for GenomeParams {
    fn default() -> Self {
        Self {
            genome: None,
            arena_count: 5,
            corridor_count: 6,
            min_arena_dim: 3,
            max_arena_dim: 8,
            max_corridor_len: 20,
            passage_width: 1,
            thresholds: RegionThresholds { wall: 3, room: 4 },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Upper bound on equal-length shortest paths enumerated per node pair.
    pub betweenness_path_cap: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { betweenness_path_cap: 16 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMethod {
    Heuristic,
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityPreference {
    Low,
    High,
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceCategory {
    pub name: String,
    pub symbol: char,
    pub count: usize,
    pub method: PlacementMethod,
    /// At most one per room, and tiles far from placed objects score higher.
    pub restrict_distance: bool,
    pub degree_low: f64,
    pub degree_high: f64,
    pub visibility: VisibilityPreference,
}

impl Default for ResourceCategory {
    fn default() -> Self {
        Self {
            name: "resource".to_string(),
            symbol: 'x',
            count: 1,
            method: PlacementMethod::Heuristic,
            restrict_distance: true,
            degree_low: 0.0,
            degree_high: 1.0,
            visibility: VisibilityPreference::Neutral,
        }
    }
}

impl ResourceCategory {
    fn preset(
        name: &str,
        symbol: char,
        count: usize,
        band: (f64, f64),
        visibility: VisibilityPreference,
    ) -> Self {
        Self {
            name: name.to_string(),
            symbol,
            count,
            degree_low: band.0,
            degree_high: band.1,
            visibility,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementWeights {
    pub room_degree: f64,
    pub room_distance: f64,
    pub room_redundancy: f64,
    pub tile_visibility: f64,
    pub tile_wall_distance: f64,
    pub tile_object_distance: f64,
}

impl Default for PlacementWeights {
    fn default() -> Self {
        Self {
            room_degree: 0.4,
            room_distance: 0.4,
            room_redundancy: 0.2,
            tile_visibility: 0.4,
            tile_wall_distance: 0.3,
            tile_object_distance: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub weights: PlacementWeights,
    /// Placed in order: spawn points, medkits, then the ammo waves.
    pub categories: Vec<ResourceCategory>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        use VisibilityPreference::{High, Low, Neutral};
        Self {
            weights: PlacementWeights::default(),
            categories: vec![
                ResourceCategory::preset("spawn", 's', 4, (0.0, 0.35), Low),
                ResourceCategory::preset("medkit", 'h', 2, (0.4, 0.7), Neutral),
                ResourceCategory::preset("ammo", 'a', 2, (0.7, 1.0), High),
                ResourceCategory::preset("ammo", 'a', 2, (0.3, 0.6), High),
            ],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for `<seed>_map.txt`; nothing is written when unset.
    pub directory: Option<PathBuf>,
    /// Also write `<seed>_properties.json`.
    pub properties: bool,
}

/// Characters that delimit AB genomes and so cannot name a tile.
const GENOME_DELIMITERS: [char; 4] = ['<', '>', ',', '|'];

impl GenerationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, GenerationError> {
        let config: GenerationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, GenerationError> {
        let text = fs::read_to_string(path)
            .map_err(|source| GenerationError::ConfigIo { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn resolved_seed(&self) -> String {
        if self.auto_seed { runtime_seed_string() } else { self.seed.clone() }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        let invalid = |reason: String| Err(GenerationError::InvalidConfig(reason));

        if self.width < 3 || self.height < 3 {
            let (width, height) = (self.width, self.height);
            return invalid(format!("grid must be at least 3x3, got {width}x{height}"));
        }
        if self.symbols.wall == self.symbols.floor {
            return invalid("wall and floor symbols must differ".to_string());
        }
        if let Some(symbol) = [self.symbols.wall, self.symbols.floor]
            .into_iter()
            .chain(self.placement.categories.iter().map(|category| category.symbol))
            .find(|symbol| GENOME_DELIMITERS.contains(symbol))
        {
            return invalid(format!("symbol '{symbol}' is reserved by the genome notation"));
        }
        if self.strategy.passage_width() == 0 {
            return invalid("passage width must be at least 1".to_string());
        }

        match &self.strategy {
            StrategyConfig::Cellular(params) => {
                if params.fill_percent > 100 {
                    return invalid(format!("fill percent {} exceeds 100", params.fill_percent));
                }
                if params.smoothing_iterations > 3 {
                    return invalid(format!(
                        "smoothing iterations {} exceed 3",
                        params.smoothing_iterations
                    ));
                }
            }
            StrategyConfig::Divisive(params) => {
                let lower = params.divide_lower_percent;
                let upper = params.divide_upper_percent;
                let percent = 0.0..=100.0;
                if !percent.contains(&lower) || !percent.contains(&upper) || lower > upper {
                    return invalid(format!("divide bounds {lower}..{upper} are not a valid range"));
                }
                if params.min_room_dim < 3 {
                    return invalid("minimum room dimension must be at least 3".to_string());
                }
            }
            StrategyConfig::Genome(params) => {
                if params.min_arena_dim == 0 || params.min_arena_dim > params.max_arena_dim {
                    return invalid(format!(
                        "arena dimensions {}..{} are not a valid range",
                        params.min_arena_dim, params.max_arena_dim
                    ));
                }
            }
        }

        for category in &self.placement.categories {
            if category.symbol == self.symbols.wall || category.symbol == self.symbols.floor {
                return invalid(format!(
                    "resource '{}' reuses the wall or floor symbol '{}'",
                    category.name, category.symbol
                ));
            }
            if !(0.0..=1.0).contains(&category.degree_low)
                || !(0.0..=1.0).contains(&category.degree_high)
                || category.degree_low > category.degree_high
            {
                return invalid(format!("resource '{}' has an invalid degree band", category.name));
            }
        }

        Ok(())
    }
}
