//! A voxel world engine core.
//!
//! The world is split into cubic chunks of `N³` blocks. A [ChunkGenerator] produces block data for a chunk,
//! the [GreedyMesher] turns it into a small set of textured quads, and the [StreamingManager] keeps the chunks
//! around an observer resident, meshing them on a worker pool and evicting them once the observer moved away.
//!
//! [ChunkGenerator]: world::worldgen::ChunkGenerator
//! [GreedyMesher]: world::meshing::GreedyMesher
//! [StreamingManager]: world::streaming::StreamingManager

pub mod config;
pub mod timing;
pub mod vector_utils;
pub mod world;

pub use config::WorldConfig;
pub use world::block::{Block, BlockType, Side};
pub use world::block_registry::BlockRegistry;
pub use world::chunk_data::ChunkData;
pub use world::error::WorldError;
pub use world::index::Index3;
pub use world::location::{ChunkLocation, WorldLocation};
pub use world::mesh::ChunkMesh;
pub use world::meshing::GreedyMesher;
pub use world::streaming::{MeshSink, StreamingManager, StreamingStats, TickSummary};
pub use world::worldgen::{ChunkGenerator, GeneratorKind};
