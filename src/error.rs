//! Error types shared by the engine, the search configuration and the drivers.

use std::path::PathBuf;

/// Errors raised while building or editing a `Board`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("cell ({row}, {col}) is outside a {rows}x{cols} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unrecognized character '{glyph}' in row {row} col {col}")]
    UnrecognizedGlyph { glyph: char, row: usize, col: usize },

    #[error("palette size must be between 1 and {max}, got {found}")]
    InvalidPalette { found: usize, max: usize },
}

/// Reasons a move is refused. The board is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("component of size {size} is not removable (need at least 2 cells)")]
    NotRemovable { size: usize },

    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("cell ({row}, {col}) is empty")]
    EmptyCell { row: usize, col: usize },

    #[error("component anchored at ({row}, {col}) does not match the board")]
    StaleComponent { row: usize, col: usize },
}

/// Errors that can occur when loading engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
