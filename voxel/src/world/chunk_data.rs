use std::fmt::{Debug, Formatter};

use crate::world::block::Block;
use crate::world::error::WorldError;
use crate::world::index::Index3;

/// The block array of a single chunk.
///
/// Chunks that consist of a single block type (all empty or all filled) are stored as one uniform block
/// instead of `N³` copies of it.
#[derive(Clone, PartialEq, Eq)]
pub struct ChunkData {
    index: Index3,
    voxels: Voxels,
}

#[derive(Clone, PartialEq, Eq)]
enum Voxels {
    Dense(Box<[Block]>),
    Uniform(Block),
}

impl Debug for ChunkData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.voxels {
            Voxels::Dense(_) => write!(f, "ChunkData({}³, dense)", self.index.size()),
            Voxels::Uniform(block) => write!(f, "ChunkData({}³, uniform {:?})", self.index.size(), block.ty),
        }
    }
}

impl ChunkData {
    pub fn empty(index: Index3) -> Self {
        Self::uniform(index, Block::EMPTY)
    }

    pub fn uniform(index: Index3, block: Block) -> Self {
        Self {
            index,
            voxels: Voxels::Uniform(block),
        }
    }

    /// Takes ownership of a block array laid out as described by [Index3].
    pub fn from_blocks(index: Index3, blocks: Vec<Block>) -> Result<Self, WorldError> {
        if blocks.len() != index.volume() {
            return Err(WorldError::InvalidBlockCount {
                expected: index.volume(),
                actual: blocks.len(),
            });
        }

        Ok(Self {
            index,
            voxels: Voxels::Dense(blocks.into_boxed_slice()),
        })
    }

    pub fn index(&self) -> Index3 {
        self.index
    }

    pub fn size(&self) -> usize {
        self.index.size()
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Result<Block, WorldError> {
        let linear = self.index.to_linear(x, y, z)?;

        Ok(match &self.voxels {
            Voxels::Dense(blocks) => blocks[linear],
            Voxels::Uniform(block) => *block,
        })
    }

    /// Whether a non-empty block sits at the given position. Anything outside of this chunk counts as empty.
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z)
            .is_ok_and(|block| block.is_solid())
    }

    pub fn set(&mut self, x: i32, y: i32, z: i32, new_block: Block) -> Result<(), WorldError> {
        let linear = self.index.to_linear(x, y, z)?;

        match &mut self.voxels {
            Voxels::Dense(blocks) => blocks[linear] = new_block,
            Voxels::Uniform(block) => {
                if *block == new_block {
                    return Ok(());
                }

                let mut blocks = vec![*block; self.index.volume()].into_boxed_slice();
                blocks[linear] = new_block;
                self.voxels = Voxels::Dense(blocks);
            }
        }

        Ok(())
    }

    /// Fills every position with `y < height` with `block`.
    pub fn fill_layers(&mut self, height: usize, block: Block) {
        let n = self.index.size();
        let height = height.min(n);

        for (z, y, x) in itertools::iproduct!(0..n, 0..height, 0..n) {
            // in bounds by construction of the ranges above
            let _ = self.set(x as i32, y as i32, z as i32, block);
        }
    }

    /// Collapses a dense array whose blocks are all identical into the uniform representation.
    pub fn compact(&mut self) {
        let Voxels::Dense(blocks) = &self.voxels else {
            return;
        };

        if let Some((first, rest)) = blocks.split_first()
            && rest.iter().all(|block| block == first)
        {
            self.voxels = Voxels::Uniform(*first);
        }
    }

    pub fn uniform_block(&self) -> Option<Block> {
        match self.voxels {
            Voxels::Uniform(block) => Some(block),
            Voxels::Dense(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.voxels {
            Voxels::Uniform(block) => block.is_empty(),
            Voxels::Dense(blocks) => blocks.iter().all(|block| block.is_empty()),
        }
    }

    pub fn solid_count(&self) -> usize {
        match &self.voxels {
            Voxels::Uniform(block) if block.is_solid() => self.index.volume(),
            Voxels::Uniform(_) => 0,
            Voxels::Dense(blocks) => blocks.iter().filter(|block| block.is_solid()).count(),
        }
    }

    /// Bytes used by the block storage.
    pub fn memory_size(&self) -> usize {
        match &self.voxels {
            Voxels::Uniform(_) => size_of::<Block>(),
            Voxels::Dense(blocks) => size_of_val(&**blocks),
        }
    }
}
