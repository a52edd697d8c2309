pub mod block;
pub mod block_registry;
pub mod chunk;
pub mod chunk_data;
pub mod chunk_store;
pub mod error;
pub mod index;
pub mod location;
pub mod mesh;
pub mod meshing;
pub mod streaming;
pub mod worldgen;

pub const DEFAULT_CHUNK_SIZE: usize = 32;
