//! Writes finished maps and their statistics next to each other, named after the seed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::graph::analysis::MapProperties;
use crate::grid::Grid;
use crate::types::Symbols;

/// Keeps ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
pub fn sanitize_seed(seed: &str) -> String {
    let sanitized: String = seed
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if sanitized.is_empty() { "_".to_string() } else { sanitized }
}

pub fn map_path(directory: &Path, seed: &str) -> PathBuf {
    directory.join(format!("{}_map.txt", sanitize_seed(seed)))
}

pub fn properties_path(directory: &Path, seed: &str) -> PathBuf {
    directory.join(format!("{}_properties.json", sanitize_seed(seed)))
}

pub fn export_grid(
    grid: &Grid,
    symbols: &Symbols,
    directory: &Path,
    seed: &str,
) -> io::Result<PathBuf> {
    let path = map_path(directory, seed);
    fs::write(&path, grid.to_text(symbols))?;
    Ok(path)
}

pub fn export_properties(
    properties: &MapProperties,
    directory: &Path,
    seed: &str,
) -> io::Result<PathBuf> {
    let path = properties_path(directory, seed);
    let json = serde_json::to_string_pretty(properties).map_err(io::Error::other)?;
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, Tile};

    #[test]
    fn seed_is_sanitized_for_file_names() {
        assert_eq!(sanitize_seed("test-1"), "test-1");
        assert_eq!(sanitize_seed("a b/c.d"), "a_b_c_d");
        assert_eq!(sanitize_seed(""), "_");
    }

    #[test]
    fn grid_is_written_row_major_with_symbols() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut grid = Grid::new(3, 2, Tile::Wall);
        grid.set(Coord::new(1, 1), Tile::Floor);
        grid.set(Coord::new(1, 2), Tile::Resource('s'));

        let path = export_grid(&grid, &Symbols::default(), dir.path(), "seed 1").expect("written");
        assert_eq!(path.file_name().and_then(|name| name.to_str()), Some("seed_1_map.txt"));
        assert_eq!(fs::read_to_string(path).expect("readable"), "www\nwrs\n");
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("does-not-exist");
        let grid = Grid::new(3, 3, Tile::Floor);
        assert!(export_grid(&grid, &Symbols::default(), &missing, "x").is_err());
    }
}
