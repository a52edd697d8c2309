use cgmath::Vector3;

use crate::world::block::BlockType;
use crate::world::meshing::direction::Direction;

/// One greedily merged rectangular face in chunk-local block coordinates.
///
/// Corners are ordered left-top, right-top, left-bottom, right-bottom. "Right" runs along the first in-plane
/// axis of the face and "bottom" along the second one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Quad {
    pub corners: [Vector3<i32>; 4],
    pub direction: Direction,
    pub block_type: BlockType,
}

impl Quad {
    /// Builds a quad from its left-top corner and the two edge vectors.
    pub fn new(origin: Vector3<i32>, du: Vector3<i32>, dv: Vector3<i32>, direction: Direction, block_type: BlockType) -> Self {
        Self {
            corners: [origin, origin + du, origin + dv, origin + du + dv],
            direction,
            block_type,
        }
    }

    pub fn lt(&self) -> Vector3<i32> {
        self.corners[0]
    }

    pub fn rt(&self) -> Vector3<i32> {
        self.corners[1]
    }

    pub fn lb(&self) -> Vector3<i32> {
        self.corners[2]
    }

    pub fn rb(&self) -> Vector3<i32> {
        self.corners[3]
    }

    pub fn width(&self) -> i32 {
        edge_length(self.rt() - self.lt())
    }

    pub fn height(&self) -> i32 {
        edge_length(self.lb() - self.lt())
    }

    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }
}

fn edge_length(edge: Vector3<i32>) -> i32 {
    edge.x.abs() + edge.y.abs() + edge.z.abs()
}
