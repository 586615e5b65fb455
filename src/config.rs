//! World configuration file (JSON)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::streaming::StreamingConfig;
use crate::terrain::TerrainConfig;

/// Everything needed to stream a world: terrain shape and streaming policy.
///
/// Missing fields fall back to their defaults, so a file only needs to name
/// what it changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub terrain: TerrainConfig,
    pub streaming: StreamingConfig,
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.streaming.validate()?;
        Ok(())
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate from file (sync)
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded world config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("world.json");

        let mut config = WorldConfig::default();
        config.terrain.seed = 4242;
        config.streaming.load_radius = 2;
        config.streaming.unload_radius = 3;
        config.save_sync(&path).unwrap();

        let loaded = WorldConfig::load_sync(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        std::fs::write(&path, r#"{ "streaming": { "max_integrations_per_tick": 8 } }"#).unwrap();

        let config = WorldConfig::load_sync(&path).unwrap();
        assert_eq!(config.streaming.max_integrations_per_tick, 8);
        assert_eq!(config.streaming.load_radius, 4);
        assert_eq!(config.terrain, TerrainConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        std::fs::write(&path, r#"{ "streaming": { "load_radius": 9, "unload_radius": 2 } }"#).unwrap();

        assert!(matches!(WorldConfig::load_sync(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(WorldConfig::load_sync(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = WorldConfig::load_sync(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
