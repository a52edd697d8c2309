use std::sync::Arc;

use cgmath::Vector3;
use hashbrown::{HashMap, HashSet};
use voxel::world::streaming::area_of_interest;
use voxel::{BlockRegistry, ChunkLocation, ChunkMesh, GeneratorKind, MeshSink, StreamingManager, WorldConfig};

#[derive(Default)]
struct RecordingSink {
    meshes: HashMap<ChunkLocation, usize>,
    uploads: usize,
    unloads: usize,
}

impl MeshSink for RecordingSink {
    fn upload(&mut self, location: ChunkLocation, mesh: &ChunkMesh) {
        assert!(
            self.meshes.insert(location, mesh.vertices().len()).is_none(),
            "mesh of {location:?} uploaded twice"
        );
        self.uploads += 1;
    }

    fn unload(&mut self, location: ChunkLocation) {
        self.meshes.remove(&location);
        self.unloads += 1;
    }
}

fn perlin_manager(view_distance: i32) -> StreamingManager {
    let config = WorldConfig::from_yaml_str(&format!(
        "chunk_size: 16\nview_distance: {view_distance}\nnum_workers: 3\nseed: 7\ngenerator: perlin\n"
    ))
    .unwrap();
    assert_eq!(config.generator, GeneratorKind::Perlin);

    let registry = Arc::new(BlockRegistry::builtin().unwrap());
    let generator = config.generator.build(&registry, config.seed).unwrap();

    StreamingManager::new(&config, generator, registry).unwrap()
}

#[test]
fn test_walking_observer_keeps_area_of_interest_resident() {
    let mut manager = perlin_manager(2);
    let mut sink = RecordingSink::default();

    let mut observer = Vector3::new(8.0, 40.0, 8.0);
    for _ in 0..80 {
        manager.tick(observer, &mut sink);
        observer.x += 1.0;
        observer.z -= 0.5;
    }

    manager.tick(observer, &mut sink);
    manager.wait_for_idle();
    let summary = manager.tick(observer, &mut sink);
    assert!(!summary.area_changed);
    assert_eq!(manager.pending_evictions(), 0);

    let expected = area_of_interest(summary.observer_chunk, 2, 0);
    let resident: HashSet<ChunkLocation> = manager.store().locations().collect();
    assert_eq!(resident, expected);

    // every resident chunk has exactly one live mesh in the sink
    let uploaded: HashSet<ChunkLocation> = sink.meshes.keys().copied().collect();
    assert_eq!(uploaded, expected);
    assert!(expected.iter().all(|location| manager.is_mesh_ready(location)));

    let stats = manager.stats();
    assert_eq!(stats.generation_failures, 0);
    assert_eq!(stats.chunks_created - stats.chunks_evicted, expected.len());
    assert_eq!(sink.unloads, stats.chunks_evicted);
}

#[test]
fn test_meshes_match_between_runs() {
    let run = || {
        let mut manager = perlin_manager(1);
        let mut sink = RecordingSink::default();
        manager.tick(Vector3::new(0.0, 20.0, 0.0), &mut sink);
        manager.wait_for_idle();
        manager.tick(Vector3::new(0.0, 20.0, 0.0), &mut sink);
        sink.meshes
    };

    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}
