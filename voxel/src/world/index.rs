use cgmath::Vector3;
use itertools::iproduct;

use crate::world::DEFAULT_CHUNK_SIZE;
use crate::world::error::WorldError;

/// Largest supported chunk edge length. Keeps every local coordinate and linear index well inside `i32`.
pub const MAX_CHUNK_SIZE: usize = 256;

/// Maps local `(x, y, z)` voxel coordinates of a cubic chunk to the position inside its flat block array.
///
/// The layout is z-major: `index = z * N² + y * N + x`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Index3 {
    size: usize,
}

impl Index3 {
    pub fn new(size: usize) -> Result<Self, WorldError> {
        if size == 0 || size > MAX_CHUNK_SIZE {
            return Err(WorldError::InvalidChunkSize(size));
        }

        Ok(Self { size })
    }

    pub const fn size(self) -> usize {
        self.size
    }

    pub const fn volume(self) -> usize {
        self.size * self.size * self.size
    }

    pub fn contains(self, x: i32, y: i32, z: i32) -> bool {
        let bounds = 0..self.size as i32;
        bounds.contains(&x) && bounds.contains(&y) && bounds.contains(&z)
    }

    pub fn to_linear(self, x: i32, y: i32, z: i32) -> Result<usize, WorldError> {
        if !self.contains(x, y, z) {
            return Err(WorldError::OutOfBounds { x, y, z, size: self.size });
        }

        Ok(self.to_linear_unchecked(x as usize, y as usize, z as usize))
    }

    /// Caller guarantees all coordinates are below [Index3::size].
    #[inline]
    pub(crate) fn to_linear_unchecked(self, x: usize, y: usize, z: usize) -> usize {
        z * self.size * self.size + y * self.size + x
    }

    pub fn from_linear(self, index: usize) -> Option<Vector3<i32>> {
        (index < self.volume()).then(|| {
            let n = self.size;
            Vector3::new((index % n) as i32, (index / n % n) as i32, (index / (n * n)) as i32)
        })
    }

    /// Iterates all local positions in the same order as the linear layout.
    pub fn iter(self) -> impl Iterator<Item = Vector3<i32>> {
        let n = self.size as i32;
        iproduct!(0..n, 0..n, 0..n).map(|(z, y, x)| Vector3::new(x, y, z))
    }
}

impl Default for Index3 {
    fn default() -> Self {
        Self { size: DEFAULT_CHUNK_SIZE }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use crate::world::error::WorldError;
    use crate::world::index::Index3;

    #[test]
    fn test_linear_layout_is_z_major() {
        let index = Index3::new(4).unwrap();

        assert_eq!(index.to_linear(0, 0, 0).unwrap(), 0);
        assert_eq!(index.to_linear(1, 0, 0).unwrap(), 1);
        assert_eq!(index.to_linear(0, 1, 0).unwrap(), 4);
        assert_eq!(index.to_linear(0, 0, 1).unwrap(), 16);
        assert_eq!(index.to_linear(3, 2, 1).unwrap(), 16 + 8 + 3);
        assert_eq!(index.to_linear(3, 3, 3).unwrap(), index.volume() - 1);
    }

    #[test]
    fn test_out_of_bounds_lookup_fails() {
        let index = Index3::new(8).unwrap();

        assert!(matches!(
            index.to_linear(8, 0, 0),
            Err(WorldError::OutOfBounds { x: 8, y: 0, z: 0, size: 8 })
        ));
        assert!(index.to_linear(0, -1, 0).is_err());
        assert!(index.to_linear(0, 0, 100).is_err());
    }

    #[test]
    fn test_invalid_sizes_are_rejected() {
        assert!(Index3::new(0).is_err());
        assert!(Index3::new(257).is_err());
        assert!(Index3::new(1).is_ok());
        assert_eq!(Index3::default().size(), 32);
    }

    #[test]
    fn test_iteration_matches_linear_order() {
        let index = Index3::new(3).unwrap();

        for (linear, position) in index.iter().enumerate() {
            assert_eq!(index.to_linear(position.x, position.y, position.z).unwrap(), linear);
            assert_eq!(index.from_linear(linear), Some(position));
        }
        assert_eq!(index.iter().count(), 27);
        assert_eq!(index.from_linear(27), None);
        assert_eq!(index.from_linear(5), Some(Vector3::new(2, 1, 0)));
    }
}
