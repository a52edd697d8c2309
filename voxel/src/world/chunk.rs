use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::world::chunk_data::ChunkData;
use crate::world::location::ChunkLocation;
use crate::world::mesh::ChunkMesh;

/// Lifecycle of a resident chunk.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChunkState {
    /// Blocks are generated, the mesh task is still in flight.
    Meshing,
    /// The mesh has been written and the chunk may be unloaded.
    Resident,
}

/// The part of a chunk that its meshing task writes into.
///
/// The mesh is written exactly once, before the unload flag is raised. The flag is the only state a worker
/// publishes to the owning thread.
#[derive(Debug, Default)]
pub struct MeshSlot {
    mesh: OnceLock<ChunkMesh>,
    can_be_unloaded: AtomicBool,
}

impl MeshSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the mesh and marks the chunk as safe to unload.
    /// Returns false if a mesh had already been stored; the first mesh is kept in that case.
    pub fn complete(&self, mesh: ChunkMesh) -> bool {
        let stored = self.mesh.set(mesh).is_ok();
        self.can_be_unloaded
            .store(true, Ordering::Release);

        stored
    }

    pub fn mesh(&self) -> Option<&ChunkMesh> {
        self.mesh.get()
    }

    pub fn can_be_unloaded(&self) -> bool {
        self.can_be_unloaded
            .load(Ordering::Acquire)
    }
}

/// A generated chunk: its read-only blocks plus the slot its mesh is written into.
#[derive(Debug)]
pub struct Chunk {
    location: ChunkLocation,
    data: Arc<ChunkData>,
    mesh: Arc<MeshSlot>,
}

impl Chunk {
    /// Creates a chunk that is not yet safe to unload.
    pub fn new(location: ChunkLocation, data: ChunkData) -> Self {
        Self {
            location,
            data: Arc::new(data),
            mesh: Arc::new(MeshSlot::new()),
        }
    }

    pub fn location(&self) -> ChunkLocation {
        self.location
    }

    pub fn data(&self) -> &ChunkData {
        &self.data
    }

    /// Handles a meshing task needs: shared read-only blocks and the slot to write the mesh into.
    pub fn mesh_task_handles(&self) -> (Arc<ChunkData>, Arc<MeshSlot>) {
        (Arc::clone(&self.data), Arc::clone(&self.mesh))
    }

    pub fn mesh(&self) -> Option<&ChunkMesh> {
        self.mesh.mesh()
    }

    /// Whether `slot` belongs to this chunk and not to an earlier chunk at the same location.
    pub fn owns_slot(&self, slot: &Arc<MeshSlot>) -> bool {
        Arc::ptr_eq(&self.mesh, slot)
    }

    pub fn can_be_unloaded(&self) -> bool {
        self.mesh.can_be_unloaded()
    }

    pub fn state(&self) -> ChunkState {
        if self.can_be_unloaded() {
            ChunkState::Resident
        } else {
            ChunkState::Meshing
        }
    }
}
