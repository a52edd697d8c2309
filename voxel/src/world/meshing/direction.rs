use cgmath::Vector3;
use strum_macros::EnumIter;

use crate::world::block::Side;

/// Outward facing normal of a quad.
#[derive(EnumIter, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    XPos,
    XNeg,
    YPos,
    YNeg,
    ZPos,
    ZNeg,
}

impl Direction {
    /// The face direction along `axis` (0 = x, 1 = y, 2 = z).
    pub fn from_axis(axis: usize, positive: bool) -> Self {
        match (axis % 3, positive) {
            (0, true) => Direction::XPos,
            (0, false) => Direction::XNeg,
            (1, true) => Direction::YPos,
            (1, false) => Direction::YNeg,
            (_, true) => Direction::ZPos,
            (_, false) => Direction::ZNeg,
        }
    }

    pub fn axis(self) -> usize {
        match self {
            Direction::XPos | Direction::XNeg => 0,
            Direction::YPos | Direction::YNeg => 1,
            Direction::ZPos | Direction::ZNeg => 2,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Direction::XPos | Direction::YPos | Direction::ZPos)
    }

    pub fn to_vec(self) -> Vector3<i32> {
        match self {
            Direction::XPos => Vector3::unit_x(),
            Direction::XNeg => -Vector3::unit_x(),
            Direction::YPos => Vector3::unit_y(),
            Direction::YNeg => -Vector3::unit_y(),
            Direction::ZPos => Vector3::unit_z(),
            Direction::ZNeg => -Vector3::unit_z(),
        }
    }

    pub fn side(self) -> Side {
        match self {
            Direction::XPos => Side::East,
            Direction::XNeg => Side::West,
            Direction::YPos => Side::Top,
            Direction::YNeg => Side::Bottom,
            Direction::ZPos => Side::North,
            Direction::ZNeg => Side::South,
        }
    }
}
