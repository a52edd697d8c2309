use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use anyhow::{Context, Result};
use fastrand::Rng;
use noise::{NoiseFn, Perlin};
use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::world::block::Block;
use crate::world::block_registry::BlockRegistry;
use crate::world::chunk_data::ChunkData;
use crate::world::error::WorldError;
use crate::world::index::Index3;
use crate::world::location::ChunkLocation;

/// Produces the blocks of a chunk. Implementations must be deterministic for a given location.
///
/// Any `Fn(ChunkLocation, Index3) -> Result<ChunkData>` closure is a generator as well, which is how
/// externally authored generators are plugged in.
pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, location: ChunkLocation, index: Index3) -> Result<ChunkData>;
}

impl<F> ChunkGenerator for F
where
    F: Fn(ChunkLocation, Index3) -> Result<ChunkData> + Send + Sync,
{
    fn generate(&self, location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        self(location, index)
    }
}

/// The built-in generators, selectable by name.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Display, EnumString, EnumIter, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Flat,
    FlatHalfAndHalf,
    FlatRandom,
    FlatWithPlus,
    Half,
    Filled,
    HalfSphere,
    #[default]
    Perlin,
}

impl GeneratorKind {
    /// Resolves the blocks this generator places against `registry`.
    pub fn build(self, registry: &BlockRegistry, seed: u32) -> Result<Arc<dyn ChunkGenerator>> {
        self.build_inner(registry, seed)
            .with_context(|| format!("failed to build the {self} generator"))
    }

    fn build_inner(self, registry: &BlockRegistry, seed: u32) -> Result<Arc<dyn ChunkGenerator>, WorldError> {
        Ok(match self {
            GeneratorKind::Flat => Arc::new(FlatGenerator {
                block: registry.block("dirt")?,
            }),
            GeneratorKind::FlatHalfAndHalf => Arc::new(FlatHalfAndHalfGenerator {
                left: registry.block("dirt")?,
                right: registry.block("stone")?,
            }),
            GeneratorKind::FlatRandom => Arc::new(FlatRandomGenerator {
                blocks: [registry.block("dirt")?, registry.block("stone")?],
                seed,
            }),
            GeneratorKind::FlatWithPlus => Arc::new(FlatWithPlusGenerator {
                floor: registry.block("bedrock")?,
                wall: registry.block("dirt")?,
            }),
            GeneratorKind::Half => Arc::new(HalfGenerator {
                block: registry.block("dirt")?,
            }),
            GeneratorKind::Filled => Arc::new(FilledGenerator {
                block: registry.block("dirt")?,
            }),
            GeneratorKind::HalfSphere => Arc::new(HalfSphereGenerator {
                block: registry.block("dirt")?,
            }),
            GeneratorKind::Perlin => Arc::new(PerlinGenerator::new(registry, seed)?),
        })
    }
}

/// A single layer of `block` at the bottom of every chunk.
pub struct FlatGenerator {
    pub block: Block,
}

impl ChunkGenerator for FlatGenerator {
    fn generate(&self, _location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        let mut data = ChunkData::empty(index);
        data.fill_layers(1, self.block);
        Ok(data)
    }
}

/// A bottom layer split in two halves along x.
pub struct FlatHalfAndHalfGenerator {
    pub left: Block,
    pub right: Block,
}

impl ChunkGenerator for FlatHalfAndHalfGenerator {
    fn generate(&self, _location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        let n = index.size() as i32;
        let mut data = ChunkData::empty(index);

        for (z, x) in itertools::iproduct!(0..n, 0..n) {
            let block = if x < n / 2 { self.left } else { self.right };
            data.set(x, 0, z, block)?;
        }

        Ok(data)
    }
}

/// A bottom layer where every column randomly picks one of two blocks, seeded by the chunk location.
pub struct FlatRandomGenerator {
    pub blocks: [Block; 2],
    pub seed: u32,
}

impl ChunkGenerator for FlatRandomGenerator {
    fn generate(&self, location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        let n = index.size() as i32;
        let mut rng = chunk_rng(self.seed, location);
        let mut data = ChunkData::empty(index);

        for (z, x) in itertools::iproduct!(0..n, 0..n) {
            data.set(x, 0, z, self.blocks[rng.usize(0..2)])?;
        }

        Ok(data)
    }
}

/// Only at chunk-y 0: a floor of `floor` with a plus shaped wall of `wall` through the chunk center, a quarter
/// of the chunk high.
pub struct FlatWithPlusGenerator {
    pub floor: Block,
    pub wall: Block,
}

impl ChunkGenerator for FlatWithPlusGenerator {
    fn generate(&self, location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        let mut data = ChunkData::empty(index);
        if location.y != 0 {
            return Ok(data);
        }

        let n = index.size() as i32;
        let height = (n / 4).max(1);

        for (z, y, x) in itertools::iproduct!(0..n, 0..height, 0..n) {
            if y == 0 {
                data.set(x, y, z, self.floor)?;
            } else if x == n / 2 || z == n / 2 {
                data.set(x, y, z, self.wall)?;
            }
        }

        Ok(data)
    }
}

/// The lower half of every chunk filled.
pub struct HalfGenerator {
    pub block: Block,
}

impl ChunkGenerator for HalfGenerator {
    fn generate(&self, _location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        let mut data = ChunkData::empty(index);
        data.fill_layers(index.size() / 2, self.block);
        Ok(data)
    }
}

pub struct FilledGenerator {
    pub block: Block,
}

impl ChunkGenerator for FilledGenerator {
    fn generate(&self, _location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        Ok(ChunkData::uniform(index, self.block))
    }
}

/// The bottom quarter of a sphere centered in the chunk with a radius of half the chunk size.
pub struct HalfSphereGenerator {
    pub block: Block,
}

impl ChunkGenerator for HalfSphereGenerator {
    fn generate(&self, _location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        let n = index.size() as i32;
        let radius = (n / 2) as f64;
        let mut data = ChunkData::empty(index);

        for (z, y, x) in itertools::iproduct!(0..n, 0..(n / 4), 0..n) {
            let (dx, dy, dz) = ((x - n / 2) as f64, (y - n / 2) as f64, (z - n / 2) as f64);
            if (dx * dx + dy * dy + dz * dz).sqrt() < radius {
                data.set(x, y, z, self.block)?;
            }
        }

        Ok(data)
    }
}

struct NoiseLayer {
    pub weight: f64,
    pub scale: f64,
}

const TERRAIN_OCTAVES: [NoiseLayer; 3] = [
    NoiseLayer { scale: 0.01, weight: 0.6 },
    NoiseLayer { scale: 0.04, weight: 0.3 },
    NoiseLayer { scale: 0.1, weight: 0.1 },
];

trait LayeredNoiseGenerator {
    fn get_layered(&self, octaves: &[NoiseLayer], point: [f64; 2]) -> f64;
}

impl LayeredNoiseGenerator for Perlin {
    fn get_layered(&self, octaves: &[NoiseLayer], point: [f64; 2]) -> f64 {
        octaves
            .iter()
            .map(|layer| layer.weight * self.get([point[0] * layer.scale, point[1] * layer.scale]))
            .sum()
    }
}

const TREES_PER_CHUNK: usize = 3;
const TRUNK_HEIGHT: i32 = 4;

/// Rolling terrain: chunk-y 0 and 1 are solid stone, chunk-y 2 carries a noise height map of stone, dirt and a
/// grass top with a few trees on it. Everything else is empty.
pub struct PerlinGenerator {
    perlin: Perlin,
    seed: u32,
    stone: Block,
    dirt: Block,
    grass: Block,
    oak: Block,
    leaves: Block,
}

impl PerlinGenerator {
    pub fn new(registry: &BlockRegistry, seed: u32) -> Result<Self, WorldError> {
        Ok(Self {
            perlin: Perlin::new(seed),
            seed,
            stone: registry.block("stone")?,
            dirt: registry.block("dirt")?,
            grass: registry.block("grass")?,
            oak: registry.block("oak")?,
            leaves: registry.block("leaves")?,
        })
    }

    /// Terrain height in blocks, between 1 and half the chunk size plus one.
    fn column_height(&self, world_x: f64, world_z: f64, n: i32) -> i32 {
        let noise = self
            .perlin
            .get_layered(&TERRAIN_OCTAVES, [world_x, world_z]);
        let normalized = ((noise + 1.0) / 2.0).clamp(0.0, 1.0);

        (1 + (normalized * (n / 2) as f64).floor() as i32).min(n)
    }

    fn generate_surface(&self, location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        let n = index.size() as i32;
        let origin = location.to_world_location_f32(index);
        let mut data = ChunkData::empty(index);
        let mut heights = vec![0; index.size() * index.size()];

        for (z, x) in itertools::iproduct!(0..n, 0..n) {
            let height = self.column_height(origin.x as f64 + x as f64, origin.z as f64 + z as f64, n);
            heights[(z * n + x) as usize] = height;

            for y in 0..height {
                let block = if y <= height - 3 {
                    self.stone
                } else if y <= height - 2 {
                    self.dirt
                } else {
                    self.grass
                };
                data.set(x, y, z, block)?;
            }
        }

        if n >= 8 {
            let mut rng = chunk_rng(self.seed, location);
            for _ in 0..TREES_PER_CHUNK {
                let x = rng.i32(3..=n - 4);
                let z = rng.i32(3..=n - 4);
                let surface_y = heights[(z * n + x) as usize];
                self.try_place_tree(&mut data, x, surface_y, z)?;
            }
        }

        Ok(data)
    }

    /// Places a tree standing on `(x, y - 1, z)` if every block it needs is inside the chunk and still empty.
    fn try_place_tree(&self, data: &mut ChunkData, x: i32, y: i32, z: i32) -> Result<bool, WorldError> {
        let trunk = shape::vertical(x, y, z, TRUNK_HEIGHT);
        let leaves = [
            shape::plus(x, y + 3, z, 2, false),
            shape::circle(x, y + 3, z, false),
            shape::plus(x, y + 4, z, 1, true),
            vec![[x, y + 5, z]],
        ]
        .concat();

        let is_free = |[x, y, z]: [i32; 3]| data.get(x, y, z).is_ok_and(Block::is_empty);
        if !trunk.iter().chain(&leaves).copied().all(is_free) {
            return Ok(false);
        }

        for [x, y, z] in trunk {
            data.set(x, y, z, self.oak)?;
        }
        for [x, y, z] in leaves {
            data.set(x, y, z, self.leaves)?;
        }

        Ok(true)
    }
}

impl ChunkGenerator for PerlinGenerator {
    fn generate(&self, location: ChunkLocation, index: Index3) -> Result<ChunkData> {
        match location.y {
            0..=1 => Ok(ChunkData::uniform(index, self.stone)),
            2 => self.generate_surface(location, index),
            _ => Ok(ChunkData::empty(index)),
        }
    }
}

mod shape {
    pub fn plus(x: i32, y: i32, z: i32, size: i32, filled: bool) -> Vec<[i32; 3]> {
        let mut positions = vec![[x + size, y, z], [x - size, y, z], [x, y, z + size], [x, y, z - size]];
        if filled {
            positions.push([x, y, z]);
        }
        if size > 1 {
            positions.extend(plus(x, y, z, size - 1, false));
        }
        positions
    }

    pub fn circle(x: i32, y: i32, z: i32, filled: bool) -> Vec<[i32; 3]> {
        let mut positions = plus(x, y, z, 1, filled);
        positions.extend([[x + 1, y, z + 1], [x + 1, y, z - 1], [x - 1, y, z + 1], [x - 1, y, z - 1]]);
        positions
    }

    pub fn vertical(x: i32, y: i32, z: i32, height: i32) -> Vec<[i32; 3]> {
        (0..height).map(|h| [x, y + h, z]).collect()
    }
}

/// Deterministic random source for one chunk.
fn chunk_rng(seed: u32, location: ChunkLocation) -> Rng {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    location.hash(&mut hasher);
    Rng::with_seed(hasher.finish())
}
