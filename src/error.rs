//! Configuration-time failures.
//!
//! Everything here is raised while a level or config is being loaded, before
//! any entity exists. Movement rejections during play are not errors and
//! never show up in these types.

use std::path::PathBuf;

use crate::components::Cell;

/// A map that cannot be turned into a playable grid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown map glyph {glyph:?} at column {col}, row {row}")]
    UnknownGlyph { glyph: char, col: usize, row: usize },

    #[error("unknown cell kind {kind} at column {col}, row {row}")]
    UnknownKind { kind: u8, col: usize, row: usize },

    #[error("border cell {0:?} is not a wall")]
    UnsealedBorder(Cell),

    #[error("map has no player spawn")]
    MissingPlayerSpawn,

    #[error("map has a second player spawn at {0:?}")]
    DuplicatePlayerSpawn(Cell),

    #[error("spawn cell {0:?} is not open")]
    SpawnOnWall(Cell),
}

/// Invalid game configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{actor} speed must be a finite non-negative number, got {speed}")]
    NegativeSpeed { actor: &'static str, speed: f32 },

    #[error("tick rate must be at least 1")]
    ZeroTickRate,

    #[error("starting lives must be at least 1")]
    ZeroLives,

    #[error("ghost spawn window {min_ticks}..={max_ticks} is empty")]
    InvalidSpawnWindow { min_ticks: u32, max_ticks: u32 },

    #[error("{what} must be positive, got {value}")]
    NonPositiveSize { what: &'static str, value: f32 },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("no levels configured")]
    NoLevels,

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode preset")]
    Encode(#[from] toml::ser::Error),
}
