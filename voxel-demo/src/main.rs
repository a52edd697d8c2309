mod frame_timer;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use cgmath::Vector3;
use clap::Parser;
use log::{LevelFilter, debug, info};
use voxel::timing::TimerManager;
use voxel::{BlockRegistry, ChunkLocation, ChunkMesh, GeneratorKind, MeshSink, StreamingManager, WorldConfig};

use crate::frame_timer::FrameTimer;

/// Walks an observer through a generated world and streams the chunks around it.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// World config in YAML. Command line values take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Block registry in YAML, defaults to the built-in blocks
    #[arg(long)]
    blocks: Option<PathBuf>,

    #[arg(long)]
    chunk_size: Option<usize>,

    #[arg(long)]
    view_distance: Option<i32>,

    #[arg(long)]
    vertical_floor: Option<i32>,

    #[arg(long)]
    workers: Option<usize>,

    #[arg(long)]
    seed: Option<u32>,

    #[arg(long)]
    generator: Option<GeneratorKind>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Observer speed along +x in blocks per tick
    #[arg(long, default_value_t = 0.5)]
    speed: f32,

    /// Ticks per second, 0 runs as fast as possible
    #[arg(long, default_value_t = 0)]
    tick_rate: u32,
}

impl Args {
    fn world_config(&self) -> Result<WorldConfig> {
        let mut config = match &self.config {
            Some(path) => WorldConfig::load(path)?,
            None => WorldConfig::default(),
        };

        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(view_distance) = self.view_distance {
            config.view_distance = view_distance;
        }
        if let Some(vertical_floor) = self.vertical_floor {
            config.vertical_floor = vertical_floor;
        }
        if let Some(workers) = self.workers {
            config.num_workers = workers;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(generator) = self.generator {
            config.generator = generator;
        }

        config.validate().context("invalid world config")?;
        Ok(config)
    }
}

/// Stands in for a renderer and only keeps count of what it was handed.
#[derive(Default)]
struct StatsSink {
    resident_meshes: usize,
    uploads: usize,
    unloads: usize,
    vertices: usize,
    triangles: usize,
}

impl MeshSink for StatsSink {
    fn upload(&mut self, _location: ChunkLocation, mesh: &ChunkMesh) {
        self.resident_meshes += 1;
        self.uploads += 1;
        self.vertices += mesh.vertices().len();
        self.triangles += mesh.triangle_count();
    }

    fn unload(&mut self, _location: ChunkLocation) {
        self.resident_meshes = self.resident_meshes.saturating_sub(1);
        self.unloads += 1;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = args.world_config()?;

    let registry = match &args.blocks {
        Some(path) => BlockRegistry::load(path)?,
        None => BlockRegistry::builtin()?,
    };
    info!(
        "Loaded {} blocks using {} textures",
        registry.len(),
        registry.texture_count()
    );

    let generator = config.generator.build(&registry, config.seed)?;
    let mut manager = StreamingManager::new(&config, generator, registry.into())?;

    let mut sink = StatsSink::default();
    let mut timers = TimerManager::new();
    let mut frame_timer = FrameTimer::new(args.tick_rate);
    let mut observer = Vector3::new(0.0, (config.chunk_size * 2) as f32, 0.0);

    let start = Instant::now();
    for tick in 0..args.ticks {
        timers.start("tick");
        let summary = manager.tick(observer, &mut sink);
        timers.end("tick");

        if summary.area_changed {
            debug!(
                "tick {tick}: entered {:?}, created {}, failed {}, evicted {}, deferred {}",
                summary.observer_chunk, summary.created, summary.failed, summary.evicted, summary.deferred
            );
        }

        observer.x += args.speed;
        frame_timer.get_dt();
    }

    timers.start("drain");
    manager.wait_for_idle();
    manager.tick(observer, &mut sink);
    timers.end("drain");

    let stats = manager.stats();
    info!(
        "Simulated {} ticks in {:.2?}, {} chunks resident",
        args.ticks,
        start.elapsed(),
        manager.store().len()
    );
    info!(
        "Created {} chunks, evicted {} ({} deferrals), {} generator failures, {} meshes completed",
        stats.chunks_created, stats.chunks_evicted, stats.deferred_evictions, stats.generation_failures, stats.meshes_completed
    );
    info!(
        "Sink holds {} meshes after {} uploads and {} unloads, {} vertices and {} triangles uploaded",
        sink.resident_meshes, sink.uploads, sink.unloads, sink.vertices, sink.triangles
    );
    for (name, duration) in timers.get_all() {
        info!("Last {name}: {duration:.2?}");
    }

    Ok(())
}
