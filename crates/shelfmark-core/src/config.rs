use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root application configuration, loaded from
/// `~/.config/shelfmark/config.toml`. Every field has a default, so a
/// missing file or a partial one is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the catalog database; empty means the platform data dir.
    pub database_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Base URL of the Google Books volume API.
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: String::new(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/books/v1".to_string(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shelfmark")
            .join("config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn database_path(&self) -> PathBuf {
        if !self.storage.database_path.is_empty() {
            return PathBuf::from(&self.storage.database_path);
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shelfmark")
            .join("catalog.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str("[storage]\ndatabase_path = \"/tmp/x.db\"\n").unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/x.db"));
        assert_eq!(
            config.metadata.base_url,
            "https://www.googleapis.com/books/v1"
        );
    }

    #[test]
    fn empty_database_path_uses_the_data_dir() {
        let config = AppConfig::default();
        assert!(config.database_path().ends_with("shelfmark/catalog.db"));
    }
}
