use std::fmt::{Debug, Formatter};
use std::ops::{Add, Deref, Sub};

use cgmath::Vector3;

use crate::vector_utils::{DivEuclid, RemEuclid};
use crate::world::index::Index3;

/// An absolute block position in the world.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WorldLocation(pub Vector3<i32>);

impl WorldLocation {
    pub fn new(chunk_location: ChunkLocation, local_location: Vector3<i32>, index: Index3) -> Self {
        Self(chunk_location.0 * index.size() as i32 + local_location)
    }

    /// The block containing a world-space point.
    pub fn from_f32(position: Vector3<f32>) -> Self {
        Self(Vector3::new(
            position.x.floor() as i32,
            position.y.floor() as i32,
            position.z.floor() as i32,
        ))
    }

    /// Splits this location into the chunk containing it and the position inside that chunk.
    pub fn separate(self, index: Index3) -> (ChunkLocation, Vector3<i32>) {
        let size = index.size() as i32;
        (ChunkLocation(self.0.div_euclid(size)), self.0.rem_euclid(size))
    }
}

/// The location of a specific chunk in the world.
/// Each ChunkLocation unit is one chunk edge length in world units; chunk `c` covers the half-open range
/// `[c * N, (c + 1) * N)` on every axis.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ChunkLocation(Vector3<i32>);

impl ChunkLocation {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// The chunk containing a world-space point, i.e. the chunk whose center is nearest to it.
    /// Positions exactly on a chunk boundary belong to the chunk on the positive side. Positions beyond the
    /// representable chunk range saturate.
    pub fn from_world_location_f32(location: Vector3<f32>, index: Index3) -> Self {
        let size = index.size() as f32;
        Self(Vector3::new(
            (location.x / size).floor() as i32,
            (location.y / size).floor() as i32,
            (location.z / size).floor() as i32,
        ))
    }

    /// World-space position of this chunk's minimum corner. Computed in floating point, so chunk locations far
    /// beyond the `i32` block range still map to a position.
    pub fn to_world_location_f32(self, index: Index3) -> Vector3<f32> {
        let size = index.size() as f32;
        Vector3::new(self.0.x as f32 * size, self.0.y as f32 * size, self.0.z as f32 * size)
    }

    /// Distance in chunks along the axis where the two locations differ most.
    pub fn chebyshev_distance(self, other: ChunkLocation) -> i32 {
        let d = self.0 - other.0;
        d.x.abs().max(d.y.abs()).max(d.z.abs())
    }
}

impl From<Vector3<i32>> for ChunkLocation {
    fn from(value: Vector3<i32>) -> Self {
        Self(value)
    }
}

impl Debug for ChunkLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

impl Add for ChunkLocation {
    type Output = ChunkLocation;

    fn add(self, rhs: Self) -> Self::Output {
        ChunkLocation(self.0 + rhs.0)
    }
}

impl Sub for ChunkLocation {
    type Output = ChunkLocation;

    fn sub(self, rhs: Self) -> Self::Output {
        ChunkLocation(self.0 - rhs.0)
    }
}

impl Deref for ChunkLocation {
    type Target = Vector3<i32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
