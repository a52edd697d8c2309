use std::path::Path;

use anyhow::{Context, Result};
use enum_map::EnumMap;
use hashbrown::HashMap;
use serde::Deserialize;
use strum::IntoEnumIterator;

use crate::world::block::{Block, BlockType, Side};
use crate::world::error::WorldError;

const BUILTIN_BLOCKS: &str = include_str!("../../assets/blocks.yml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockEntry {
    id: String,
    name: String,
    #[serde(default)]
    texture: bool,
    #[serde(default)]
    textures: Vec<String>,
}

/// Everything the registry knows about one block type.
#[derive(Clone, Debug)]
pub struct BlockDescriptor {
    pub id: String,
    pub name: String,
    pub block_type: BlockType,
    textures: EnumMap<Side, u32>,
}

impl BlockDescriptor {
    pub fn texture_index(&self, side: Side) -> u32 {
        self.textures[side]
    }
}

/// Immutable table of block types and their per-side texture indices.
///
/// Built once at start-up and shared by reference (usually behind an `Arc`) with chunk generators and the mesher.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    blocks: Vec<BlockDescriptor>,
    ids: HashMap<String, BlockType>,
    texture_count: u32,
}

impl BlockRegistry {
    /// The registry shipped with the library: bedrock, dirt, grass, cobblestone, stone, oak and leaves.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_BLOCKS).context("failed to parse the built-in block registry")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).with_context(|| format!("failed to read block registry {}", path.display()))?;

        Self::from_yaml_str(&yaml).with_context(|| format!("failed to load block registry {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let entries: Vec<BlockEntry> = serde_yaml::from_str(yaml).context("malformed block registry")?;

        Ok(Self::from_entries(entries)?)
    }

    fn from_entries(entries: Vec<BlockEntry>) -> Result<Self, WorldError> {
        let mut blocks = Vec::with_capacity(entries.len());
        let mut ids = HashMap::with_capacity(entries.len());
        let mut next_texture_index = 0;

        for (position, entry) in entries.into_iter().enumerate() {
            let block_type = u16::try_from(position + 1)
                .map(BlockType)
                .map_err(|_| WorldError::InvalidRegistry(format!("at most {} block types are supported", u16::MAX)))?;

            if ids.contains_key(&entry.id) {
                return Err(WorldError::InvalidRegistry(format!("duplicate block id `{}`", entry.id)));
            }

            let mut textures: EnumMap<Side, Option<u32>> = EnumMap::default();
            match (entry.texture, entry.textures.as_slice()) {
                (true, []) => {
                    textures = EnumMap::from_fn(|_| Some(next_texture_index));
                    next_texture_index += 1;
                }
                (false, []) => {
                    return Err(WorldError::InvalidRegistry(format!("block `{}` has no texture information", entry.id)));
                }
                (true, _) => {
                    return Err(WorldError::InvalidRegistry(format!(
                        "block `{}` sets both `texture` and `textures`",
                        entry.id
                    )));
                }
                (false, specs) => {
                    for spec in specs {
                        for side in parse_texture_spec(spec)? {
                            textures[side] = Some(next_texture_index);
                        }
                        next_texture_index += 1;
                    }
                }
            }

            if let Some(side) = Side::iter().find(|&side| textures[side].is_none()) {
                return Err(WorldError::InvalidRegistry(format!(
                    "block `{}` has no texture for its {side} side",
                    entry.id
                )));
            }

            ids.insert(entry.id.clone(), block_type);
            blocks.push(BlockDescriptor {
                id: entry.id,
                name: entry.name,
                block_type,
                textures: textures.map(|_, index| index.unwrap_or_default()),
            });
        }

        Ok(Self {
            blocks,
            ids,
            texture_count: next_texture_index,
        })
    }

    pub fn block_type(&self, id: &str) -> Result<BlockType, WorldError> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| WorldError::UnknownBlock(id.to_owned()))
    }

    pub fn block(&self, id: &str) -> Result<Block, WorldError> {
        self.block_type(id).map(Block::new)
    }

    pub fn descriptor(&self, block_type: BlockType) -> Option<&BlockDescriptor> {
        let position = usize::from(block_type.0).checked_sub(1)?;
        self.blocks.get(position)
    }

    /// Texture layer for one side of a block type. `None` for [BlockType::EMPTY] and unknown types.
    pub fn texture_index(&self, block_type: BlockType, side: Side) -> Option<u32> {
        self.descriptor(block_type)
            .map(|descriptor| descriptor.texture_index(side))
    }

    pub fn texture_count(&self) -> u32 {
        self.texture_count
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.blocks.iter()
    }
}

fn parse_texture_spec(spec: &str) -> Result<Vec<Side>, WorldError> {
    if let Some(side) = Side::from_name(spec) {
        return Ok(vec![side]);
    }

    if spec.is_empty() {
        return Err(WorldError::InvalidRegistry("empty texture spec".to_owned()));
    }

    spec.chars()
        .map(|abbreviation| {
            Side::from_abbreviation(abbreviation)
                .ok_or_else(|| WorldError::InvalidRegistry(format!("unknown side `{abbreviation}` in texture spec `{spec}`")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use crate::world::block::{BlockType, Side};
    use crate::world::block_registry::BlockRegistry;

    #[test]
    fn test_builtin_block_types_start_at_one() {
        let registry = BlockRegistry::builtin().unwrap();

        assert_eq!(registry.len(), 7);
        assert_eq!(registry.block_type("bedrock").unwrap(), BlockType(1));
        assert_eq!(registry.block_type("dirt").unwrap(), BlockType(2));
        assert_eq!(registry.block_type("stone").unwrap(), BlockType(5));
        assert_eq!(registry.block_type("leaves").unwrap(), BlockType(7));
        assert!(registry.block_type("diamond").is_err());
        assert!(registry.descriptor(BlockType::EMPTY).is_none());
        assert_eq!(registry.descriptor(BlockType(3)).unwrap().name, "Grass");
    }

    #[test]
    fn test_texture_indices_follow_texture_specs() {
        let registry = BlockRegistry::builtin().unwrap();
        let grass = registry.block_type("grass").unwrap();

        assert_eq!(registry.texture_index(grass, Side::Top), Some(2));
        assert_eq!(registry.texture_index(grass, Side::Bottom), Some(3));
        for side in [Side::North, Side::South, Side::East, Side::West] {
            assert_eq!(registry.texture_index(grass, side), Some(4));
        }

        let dirt = registry.block_type("dirt").unwrap();
        for side in Side::iter() {
            assert_eq!(registry.texture_index(dirt, side), Some(1));
        }

        assert_eq!(registry.texture_index(BlockType::EMPTY, Side::Top), None);
        assert_eq!(registry.texture_count(), 10);
    }

    #[test]
    fn test_invalid_registries_are_rejected() {
        let duplicate = "
- id: dirt
  name: Dirt
  texture: true
- id: dirt
  name: Dirt again
  texture: true
";
        assert!(BlockRegistry::from_yaml_str(duplicate).is_err());

        let missing_side = "
- id: grass
  name: Grass
  textures: [top, nsew]
";
        assert!(BlockRegistry::from_yaml_str(missing_side).is_err());

        let bad_abbreviation = "
- id: grass
  name: Grass
  textures: [tbx, nsew]
";
        assert!(BlockRegistry::from_yaml_str(bad_abbreviation).is_err());

        let no_texture = "
- id: glass
  name: Glass
";
        assert!(BlockRegistry::from_yaml_str(no_texture).is_err());
    }
}
