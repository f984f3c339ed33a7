//! Error types for the block grid cache

use glam::UVec3;
use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("key is already cached; add() requires an absent key")]
    DuplicateKey,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("grid size {grid_size} has zero capacity")]
    ZeroCapacity { grid_size: UVec3 },

    #[error("grid size {grid_size} exceeds addressable capacity")]
    CapacityOverflow { grid_size: UVec3 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
