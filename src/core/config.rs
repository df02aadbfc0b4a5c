//! Streaming pipeline configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Settings for the chunk pool, the worker pipeline and the save folder.
///
/// Every field has a default, so a JSON file only needs to name the values it
/// overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Manhattan radius (in chunks) around the observer that must stay resident.
    pub render_distance: u32,
    /// Fixed number of chunk slots in the pool.
    pub pool_size: usize,
    /// Root folder holding one sub-folder per world.
    pub save_dir: PathBuf,
    /// World folder name below `save_dir`.
    pub world_name: String,
    /// Textual world seed, hashed into the 16 noise seeds.
    pub seed: String,
    /// Eviction only runs while fewer than this many slots are free.
    pub free_slot_low_water: usize,
    /// Render-list passes a chunk must spend out of range before it can be evicted.
    pub eviction_ticks: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 8,
            pool_size: 600,
            save_dir: PathBuf::from("saves"),
            world_name: "world".to_string(),
            seed: "Hello".to_string(),
            free_slot_low_water: 20,
            eviction_ticks: 10,
        }
    }
}

impl StreamingConfig {
    /// Config sized the way the game client sizes its pool: `(2r+1)² · 3` slots.
    pub fn for_render_distance(render_distance: u32) -> Self {
        let side = 2 * render_distance as usize + 1;
        Self {
            render_distance,
            pool_size: side * side * 3,
            ..Self::default()
        }
    }

    /// Read a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Number of chunk coordinates in the render disk.
    pub fn disk_size(&self) -> usize {
        let r = self.render_distance as usize;
        2 * r * r + 2 * r + 1
    }

    /// Reject settings the pool cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::Config("pool_size must be at least 1".into()));
        }
        if self.pool_size < self.disk_size() {
            return Err(Error::Config(format!(
                "pool_size {} cannot hold the {} chunks of render distance {}",
                self.pool_size,
                self.disk_size(),
                self.render_distance
            )));
        }
        if self.world_name.is_empty() {
            return Err(Error::Config("world_name must not be empty".into()));
        }
        Ok(())
    }

    /// Folder holding this world's chunk files.
    pub fn world_dir(&self) -> PathBuf {
        self.save_dir.join(&self.world_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StreamingConfig::default();
        assert_eq!(config.render_distance, 8);
        assert_eq!(config.pool_size, 600);
        assert_eq!(config.free_slot_low_water, 20);
        assert_eq!(config.eviction_ticks, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_render_distance() {
        let config = StreamingConfig::for_render_distance(8);
        assert_eq!(config.pool_size, 17 * 17 * 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_disk_size() {
        let mut config = StreamingConfig::default();
        config.render_distance = 1;
        assert_eq!(config.disk_size(), 5);
        config.render_distance = 0;
        assert_eq!(config.disk_size(), 1);
    }

    #[test]
    fn test_validate_rejects_small_pool() {
        let mut config = StreamingConfig::default();
        config.render_distance = 1;
        config.pool_size = 4;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        config.pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: StreamingConfig =
            serde_json::from_str(r#"{ "render_distance": 2, "world_name": "test" }"#).unwrap();
        assert_eq!(config.render_distance, 2);
        assert_eq!(config.world_name, "test");
        assert_eq!(config.pool_size, 600);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streaming.json");
        let mut config = StreamingConfig::default();
        config.seed = "abc 123".to_string();
        config.save(&path).unwrap();

        let loaded = StreamingConfig::load(&path).unwrap();
        assert_eq!(loaded.seed, "abc 123");
        assert_eq!(loaded.world_dir(), PathBuf::from("saves").join("world"));
    }
}
