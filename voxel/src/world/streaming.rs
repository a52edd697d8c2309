use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use cgmath::Vector3;
use crossbeam_queue::SegQueue;
use hashbrown::{HashMap, HashSet};
use itertools::iproduct;
use log::{debug, info, trace, warn};
use threadpool::ThreadPool;

use crate::config::{MAX_VIEW_DISTANCE, WorldConfig};
use crate::world::block::Block;
use crate::world::block_registry::BlockRegistry;
use crate::world::chunk::{Chunk, MeshSlot};
use crate::world::chunk_data::ChunkData;
use crate::world::chunk_store::ChunkStore;
use crate::world::error::WorldError;
use crate::world::index::Index3;
use crate::world::location::{ChunkLocation, WorldLocation};
use crate::world::mesh::ChunkMesh;
use crate::world::meshing::GreedyMesher;
use crate::world::worldgen::ChunkGenerator;

pub(crate) const NUM_STREAM_MESHES_PER_TICK: usize = 256;
const STUCK_EVICTION_WARN_TICKS: u32 = 600;

/// Receives finished chunk meshes, e.g. a renderer uploading them to the GPU.
pub trait MeshSink {
    fn upload(&mut self, location: ChunkLocation, mesh: &ChunkMesh);

    /// Called when a chunk is evicted. May be called for chunks whose mesh was never uploaded.
    fn unload(&mut self, location: ChunkLocation);
}

/// A sink that drops every mesh.
pub struct DiscardSink;

impl MeshSink for DiscardSink {
    fn upload(&mut self, _location: ChunkLocation, _mesh: &ChunkMesh) {}

    fn unload(&mut self, _location: ChunkLocation) {}
}

/// Running totals over the lifetime of a [StreamingManager].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StreamingStats {
    pub chunks_created: usize,
    pub chunks_evicted: usize,
    pub deferred_evictions: usize,
    pub generation_failures: usize,
    pub meshes_completed: usize,
}

/// What a single [StreamingManager::tick] did.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TickSummary {
    pub observer_chunk: ChunkLocation,
    /// Whether the observer entered a new chunk and the area of interest was recomputed.
    pub area_changed: bool,
    pub created: usize,
    pub failed: usize,
    pub evicted: usize,
    pub deferred: usize,
    pub streamed: usize,
}

/// All chunk locations within `view_distance` chunks of `center` along every axis, never below `vertical_floor`.
pub fn area_of_interest(center: ChunkLocation, view_distance: i32, vertical_floor: i32) -> HashSet<ChunkLocation> {
    let r = view_distance.max(0);
    let span = |c: i32| c.saturating_sub(r)..=c.saturating_add(r);
    let ys = center.y.saturating_sub(r).max(vertical_floor)..=center.y.saturating_add(r);

    iproduct!(span(center.x), ys, span(center.z))
        .map(|(x, y, z)| ChunkLocation::new(x, y, z))
        .collect()
}

/// Keeps the set of resident chunks in sync with an observer position.
///
/// Chunks entering the area of interest are generated on the calling thread and meshed on a worker pool.
/// Chunks leaving it are evicted once their mesh task has finished; until then their eviction is retried
/// every tick. The calling thread exclusively owns the [ChunkStore], workers only see the read-only block data
/// and the [MeshSlot] of the chunk they mesh.
pub struct StreamingManager {
    store: ChunkStore,
    generator: Arc<dyn ChunkGenerator>,
    registry: Arc<BlockRegistry>,
    index: Index3,
    view_distance: i32,
    vertical_floor: i32,

    last_observer_chunk: Option<ChunkLocation>,
    /// Chunks to evict, with the number of ticks their eviction has been deferred so far.
    eviction_candidates: HashMap<ChunkLocation, u32>,

    meshed_chunks_queue: Arc<SegQueue<(ChunkLocation, Arc<MeshSlot>)>>,
    worker_thread_pool: ThreadPool,
    meshes_per_tick: usize,

    stats: StreamingStats,
}

impl StreamingManager {
    pub fn new(config: &WorldConfig, generator: Arc<dyn ChunkGenerator>, registry: Arc<BlockRegistry>) -> Result<Self, WorldError> {
        config.validate()?;

        let worker_thread_pool = threadpool::Builder::new()
            .num_threads(config.num_workers)
            .thread_name("chunk-mesher".to_owned())
            .build();

        Self::with_thread_pool(config, generator, registry, worker_thread_pool)
    }

    pub(crate) fn with_thread_pool(
        config: &WorldConfig,
        generator: Arc<dyn ChunkGenerator>,
        registry: Arc<BlockRegistry>,
        worker_thread_pool: ThreadPool,
    ) -> Result<Self, WorldError> {
        let index = config.index()?;

        info!(
            "Streaming {size}x{size}x{size} chunks with a view distance of {} using {} meshing workers",
            config.view_distance,
            worker_thread_pool.max_count(),
            size = index.size(),
        );

        Ok(Self {
            store: ChunkStore::new(),
            generator,
            registry,
            index,
            view_distance: config.view_distance,
            vertical_floor: config.vertical_floor,
            last_observer_chunk: None,
            eviction_candidates: HashMap::new(),
            meshed_chunks_queue: Arc::new(SegQueue::new()),
            worker_thread_pool,
            meshes_per_tick: NUM_STREAM_MESHES_PER_TICK,
            stats: StreamingStats::default(),
        })
    }

    /// Runs one update for the observer at world position `observer`. Never waits for a worker.
    pub fn tick<S: MeshSink + ?Sized>(&mut self, observer: Vector3<f32>, sink: &mut S) -> TickSummary {
        let observer_chunk = ChunkLocation::from_world_location_f32(observer, self.index);
        let mut summary = TickSummary {
            observer_chunk,
            area_changed: false,
            created: 0,
            failed: 0,
            evicted: 0,
            deferred: 0,
            streamed: 0,
        };

        if self.last_observer_chunk != Some(observer_chunk) {
            summary.area_changed = true;
            (summary.created, summary.failed) = self.update_area_of_interest(observer_chunk);
        }

        (summary.evicted, summary.deferred) = self.unload_chunks(sink);
        summary.streamed = self.stream_chunk_meshes(sink);

        summary
    }

    fn update_area_of_interest(&mut self, center: ChunkLocation) -> (usize, usize) {
        let area = area_of_interest(center, self.view_distance, self.vertical_floor);
        debug!("Observer entered chunk {center:?}, {} chunks are of interest", area.len());

        let missing: Vec<ChunkLocation> = area
            .iter()
            .filter(|location| !self.store.contains(location))
            .copied()
            .collect();

        let mut created = 0;
        let mut failed = 0;
        for location in missing {
            match self.create_chunk(location) {
                Ok(()) => created += 1,
                Err(err) => {
                    warn!("Leaving chunk {location:?} absent: {err:#}");
                    failed += 1;
                }
            }
        }
        self.stats.generation_failures += failed;

        self.store.set_area_of_interest(area);
        let previous_candidates = std::mem::take(&mut self.eviction_candidates);
        self.eviction_candidates = self
            .store
            .outside_interest()
            .map(|location| (location, previous_candidates.get(&location).copied().unwrap_or(0)))
            .collect();
        self.last_observer_chunk = Some(center);

        (created, failed)
    }

    fn create_chunk(&mut self, location: ChunkLocation) -> Result<()> {
        let data = self
            .generator
            .generate(location, self.index)
            .with_context(|| format!("generator failed for chunk {location:?}"))?;

        if data.index() != self.index {
            bail!(
                "generator returned a chunk with edge length {} instead of {}",
                data.size(),
                self.index.size()
            );
        }

        let chunk = Chunk::new(location, data);
        let (data, slot) = chunk.mesh_task_handles();
        self.store.insert(chunk);
        self.enqueue_meshing(location, data, slot);

        self.stats.chunks_created += 1;
        trace!("Created chunk {location:?}");

        Ok(())
    }

    fn enqueue_meshing(&self, location: ChunkLocation, data: Arc<ChunkData>, slot: Arc<MeshSlot>) {
        let registry = Arc::clone(&self.registry);
        let meshed_chunks_queue = Arc::clone(&self.meshed_chunks_queue);

        self.worker_thread_pool.execute(move || {
            // the slot must be completed even if meshing panics, otherwise the chunk can never be evicted
            let mesh = match catch_unwind(AssertUnwindSafe(|| GreedyMesher::generate_mesh(location, &data, &registry))) {
                Ok(mesh) => {
                    trace!("Meshed chunk {location:?} into {} quads", mesh.quads().len());
                    mesh
                }
                Err(_) => {
                    warn!("Meshing chunk {location:?} panicked, publishing an empty mesh");
                    ChunkMesh::default()
                }
            };
            slot.complete(mesh);
            meshed_chunks_queue.push((location, slot));
        });
    }

    /// Evicts candidates whose mesh task has finished and keeps the others for the next tick.
    fn unload_chunks<S: MeshSink + ?Sized>(&mut self, sink: &mut S) -> (usize, usize) {
        let store = &mut self.store;
        let mut evicted = 0;
        let mut deferred = 0;

        self.eviction_candidates
            .retain(|&location, deferrals| match store.remove(location) {
                Ok(_) => {
                    sink.unload(location);
                    evicted += 1;
                    false
                }
                Err(WorldError::ChunkBusy(_)) => {
                    *deferrals += 1;
                    if *deferrals == STUCK_EVICTION_WARN_TICKS {
                        warn!("Chunk {location:?} is still being meshed after {deferrals} ticks out of interest");
                    }
                    deferred += 1;
                    true
                }
                Err(_) => false,
            });

        if evicted > 0 || deferred > 0 {
            trace!("Evicted {evicted} chunks, {deferred} still have mesh tasks in flight");
        }

        self.stats.chunks_evicted += evicted;
        self.stats.deferred_evictions += deferred;

        (evicted, deferred)
    }

    /// Hands finished meshes of chunks that are still resident to `sink`. Meshes of evicted chunks are dropped,
    /// even if a new chunk has been created at the same location since.
    fn stream_chunk_meshes<S: MeshSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let mut streamed = 0;

        for _ in 0..self.meshes_per_tick {
            let Some((location, slot)) = self.meshed_chunks_queue.pop() else {
                break;
            };
            self.stats.meshes_completed += 1;

            let chunk = self.store.get(&location).filter(|chunk| chunk.owns_slot(&slot));
            match chunk.and_then(Chunk::mesh) {
                Some(mesh) => {
                    sink.upload(location, mesh);
                    streamed += 1;
                }
                None => trace!("Dropping mesh of chunk {location:?}, it was evicted before the mesh arrived"),
            }
        }

        streamed
    }

    /// Changes the view distance. The area of interest is recomputed on the next tick.
    pub fn set_view_distance(&mut self, view_distance: i32) {
        let view_distance = view_distance.clamp(0, MAX_VIEW_DISTANCE);
        if view_distance != self.view_distance {
            self.view_distance = view_distance;
            self.last_observer_chunk = None;
        }
    }

    /// Limits how many finished meshes a single tick hands to the sink. The rest stay queued.
    pub fn set_meshes_per_tick(&mut self, meshes_per_tick: usize) {
        self.meshes_per_tick = meshes_per_tick.max(1);
    }

    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }

    pub fn observer_chunk(&self) -> Option<ChunkLocation> {
        self.last_observer_chunk
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn stats(&self) -> StreamingStats {
        self.stats
    }

    pub fn index(&self) -> Index3 {
        self.index
    }

    /// Resident chunks that left the area of interest but still wait for their mesh task.
    pub fn pending_evictions(&self) -> usize {
        self.eviction_candidates.len()
    }

    #[cfg(test)]
    pub(crate) fn eviction_deferrals(&self, location: &ChunkLocation) -> Option<u32> {
        self.eviction_candidates.get(location).copied()
    }

    /// Mesh tasks that are queued or running.
    pub fn pending_mesh_tasks(&self) -> usize {
        self.worker_thread_pool.queued_count() + self.worker_thread_pool.active_count()
    }

    pub fn is_mesh_ready(&self, location: &ChunkLocation) -> bool {
        self.store
            .get(location)
            .is_some_and(Chunk::can_be_unloaded)
    }

    /// The block at a world position, if the chunk containing it is resident.
    pub fn block_at(&self, location: WorldLocation) -> Option<Block> {
        let (chunk_location, local) = location.separate(self.index);

        self.store
            .get(&chunk_location)?
            .data()
            .get(local.x, local.y, local.z)
            .ok()
    }

    /// Blocks until every submitted mesh task has finished. Not part of the per-tick protocol.
    pub fn wait_for_idle(&self) {
        self.worker_thread_pool.join();
    }
}
