//! Hard and soft failure types for the generation pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a generation attempt. Callers typically retry with another seed.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read configuration {path:?}: {source}")]
    ConfigIo { path: PathBuf, source: io::Error },

    #[error("no rooms survived generation")]
    NoRoomsSurvived,

    #[error("room list is empty, nothing to connect")]
    EmptyRoomList,

    #[error("{unreachable} room(s) cannot be connected to the main room")]
    Unconnectable { unreachable: usize },

    #[error("malformed genome: {0}")]
    Genome(#[from] GenomeError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenomeError {
    #[error("unexpected end of genome at byte {position}")]
    UnexpectedEnd { position: usize },

    #[error("expected '{expected}' at byte {position}, found '{found}'")]
    Expected { expected: char, found: char, position: usize },

    #[error("invalid number '{text}' at byte {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("value {value} at byte {position} is outside {min}..={max}")]
    OutOfRange { value: i32, min: i32, max: i32, position: usize },

    #[error("invalid tile symbol '{text}' at byte {position}")]
    InvalidSymbol { text: String, position: usize },

    #[error("unexpected trailing input at byte {position}")]
    TrailingInput { position: usize },
}

/// Degraded-but-usable outcomes. Logged and carried in the generation report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoftError {
    #[error("placed {placed} of {requested} '{category}' resources: no eligible tile left")]
    ResourceUnplaced { category: String, requested: usize, placed: usize },

    #[error("export to {path:?} skipped: {reason}")]
    ExportSkipped { path: PathBuf, reason: String },
}
