use enum_map::Enum;
use strum_macros::{Display, EnumIter};

/// Numeric block type. `0` is reserved for [BlockType::EMPTY], every other value is handed out by the
/// [BlockRegistry](crate::world::block_registry::BlockRegistry) in declaration order.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BlockType(pub u16);

impl BlockType {
    pub const EMPTY: Self = Self(0);

    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }
}

/// A single voxel of world content.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Block {
    pub ty: BlockType,
}

static_assertions::assert_eq_size!(Block, u16);

impl Block {
    pub const EMPTY: Self = Self::new(BlockType::EMPTY);

    pub const fn new(ty: BlockType) -> Self {
        Self { ty }
    }

    pub const fn is_empty(self) -> bool {
        self.ty.is_empty()
    }

    pub const fn is_solid(self) -> bool {
        !self.is_empty()
    }
}

/// The six faces of a block, used to pick per-side textures.
///
/// North faces `+z`, south `-z`, east `+x`, west `-x`, top `+y` and bottom `-y`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Enum, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    North,
    South,
    East,
    West,
    Top,
    Bottom,
}

impl Side {
    pub fn from_abbreviation(abbreviation: char) -> Option<Self> {
        match abbreviation {
            'n' => Some(Side::North),
            's' => Some(Side::South),
            'e' => Some(Side::East),
            'w' => Some(Side::West),
            't' => Some(Side::Top),
            'b' => Some(Side::Bottom),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "north" => Some(Side::North),
            "south" => Some(Side::South),
            "east" => Some(Side::East),
            "west" => Some(Side::West),
            "top" => Some(Side::Top),
            "bottom" => Some(Side::Bottom),
            _ => None,
        }
    }
}
