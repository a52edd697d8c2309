use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::world::DEFAULT_CHUNK_SIZE;
use crate::world::error::WorldError;
use crate::world::index::Index3;
use crate::world::worldgen::GeneratorKind;

/// Largest supported radius of the area of interest, in chunks.
pub const MAX_VIEW_DISTANCE: i32 = 32;

/// Everything the streaming core needs to know about the world it maintains.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Edge length of a chunk in blocks.
    pub chunk_size: usize,
    /// Radius of the area of interest in chunks, measured along each axis.
    pub view_distance: i32,
    /// Lowest chunk-y that is ever generated.
    pub vertical_floor: i32,
    /// Size of the meshing worker pool.
    pub num_workers: usize,
    pub seed: u32,
    pub generator: GeneratorKind,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            view_distance: 4,
            vertical_floor: 0,
            num_workers: 6,
            seed: 0,
            generator: GeneratorKind::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("malformed world config")?;
        config.validate()?;

        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).with_context(|| format!("failed to read world config {}", path.display()))?;

        Self::from_yaml_str(&yaml).with_context(|| format!("failed to load world config {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        self.index()?;

        if !(0..=MAX_VIEW_DISTANCE).contains(&self.view_distance) {
            return Err(WorldError::InvalidConfig(format!(
                "view distance must be in 0..={MAX_VIEW_DISTANCE}, got {}",
                self.view_distance
            )));
        }

        if self.num_workers == 0 {
            return Err(WorldError::InvalidConfig("at least one meshing worker is required".to_owned()));
        }

        Ok(())
    }

    pub fn index(&self) -> Result<Index3, WorldError> {
        Index3::new(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::WorldConfig;
    use crate::world::worldgen::GeneratorKind;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = WorldConfig::from_yaml_str("view_distance: 2\ngenerator: flat_with_plus\n").unwrap();

        assert_eq!(config.view_distance, 2);
        assert_eq!(config.generator, GeneratorKind::FlatWithPlus);
        assert_eq!(config.chunk_size, WorldConfig::default().chunk_size);
        assert_eq!(config.num_workers, 6);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        assert!(WorldConfig::from_yaml_str("chunk_size: 0").is_err());
        assert!(WorldConfig::from_yaml_str("view_distance: -1").is_err());
        assert!(WorldConfig::from_yaml_str("view_distance: 1000").is_err());
        assert!(WorldConfig::from_yaml_str("view_distance: 32").is_ok());
        assert!(WorldConfig::from_yaml_str("num_workers: 0").is_err());
        assert!(WorldConfig::from_yaml_str("render_distance: 3").is_err());
        assert!(WorldConfig::default().validate().is_ok());
    }
}
