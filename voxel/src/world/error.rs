use thiserror::Error;

use crate::world::index::MAX_CHUNK_SIZE;
use crate::world::location::ChunkLocation;

/// Errors produced by the world data structures.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("voxel ({x}, {y}, {z}) is outside of a chunk with edge length {size}")]
    OutOfBounds { x: i32, y: i32, z: i32, size: usize },

    #[error("invalid chunk edge length {0}, expected a value in 1..={max}", max = MAX_CHUNK_SIZE)]
    InvalidChunkSize(usize),

    #[error("expected {expected} blocks for a chunk but got {actual}")]
    InvalidBlockCount { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown block id `{0}`")]
    UnknownBlock(String),

    #[error("invalid block registry: {0}")]
    InvalidRegistry(String),

    #[error("chunk {0:?} still has a mesh task in flight")]
    ChunkBusy(ChunkLocation),

    #[error("chunk {0:?} is not resident")]
    MissingChunk(ChunkLocation),
}
