use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SortboxError};

/// Root application configuration, loaded from `~/.config/sortbox/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub organize: OrganizeConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

/// Timing of the simulated organize run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeConfig {
    /// Lower bound (inclusive) of the per-file delay.
    pub min_delay_ms: u64,
    /// Upper bound (exclusive) of the per-file delay.
    pub max_delay_ms: u64,
    /// Time a file spends in `organizing` before it becomes `organized`.
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub embed_previews: bool,
    /// Files larger than this are stored without preview data.
    pub max_preview_bytes: u64,
    /// Cap on the embedded preview data of all records in the snapshot
    /// together. Files that would exceed it are stored without preview data.
    pub max_snapshot_bytes: u64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("sortbox");

        Self {
            data_dir: data_dir.to_string_lossy().to_string(),
        }
    }
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 1000,
            settle_delay_ms: 400,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            embed_previews: true,
            max_preview_bytes: 5 * 1024 * 1024,
            max_snapshot_bytes: 25 * 1024 * 1024,
        }
    }
}

impl OrganizeConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/sortbox/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SORTBOX_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("sortbox")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.organize.max_delay_ms < self.organize.min_delay_ms {
            return Err(SortboxError::ConfigError(format!(
                "organize.max_delay_ms ({}) is below organize.min_delay_ms ({})",
                self.organize.max_delay_ms, self.organize.min_delay_ms
            )));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(SortboxError::ConfigError(
                "storage.data_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_data_dir(&mut self, dir: PathBuf) {
        self.storage.data_dir = dir.to_string_lossy().to_string();
    }

    // ─── Derived paths ─────────────────────────────────────

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    /// Path of the single snapshot file holding the file list.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}.json", crate::storage::STORAGE_KEY))
    }

    /// Where decoded previews are written before opening them.
    pub fn preview_cache_dir(&self) -> PathBuf {
        self.data_dir().join("previews")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.organize.min_delay_ms, 500);
        assert_eq!(cfg.organize.max_delay_ms, 1000);
        assert_eq!(cfg.organize.settle_delay_ms, 400);
        assert_eq!(cfg.preview.max_snapshot_bytes, 25 * 1024 * 1024);
        assert!(!cfg.storage.data_dir.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.organize.settle_delay_ms = 250;
        cfg.preview.embed_previews = false;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.organize.settle_delay_ms, 250);
        assert!(!loaded.preview.embed_previews);
        assert_eq!(loaded.storage.data_dir, cfg.storage.data_dir);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[organize]\nmin_delay_ms = 10\nmax_delay_ms = 20\n").unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.organize.min_delay_ms, 10);
        assert_eq!(cfg.organize.settle_delay_ms, 400);
        assert!(cfg.preview.embed_previews);
    }

    #[test]
    fn test_inverted_delay_range_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[organize]\nmin_delay_ms = 900\nmax_delay_ms = 100\n").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(SortboxError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg = AppConfig::load_from(Path::new("/tmp/nonexistent_sortbox_config.toml")).unwrap();
        assert_eq!(cfg.organize.max_delay_ms, 1000);
    }

    #[test]
    fn test_derived_paths() {
        let mut cfg = AppConfig::default();
        cfg.set_data_dir(PathBuf::from("/tmp/sortbox-data"));
        assert_eq!(
            cfg.snapshot_path(),
            PathBuf::from("/tmp/sortbox-data/file_organizer_files.json")
        );
        assert_eq!(cfg.preview_cache_dir(), PathBuf::from("/tmp/sortbox-data/previews"));
    }
}
