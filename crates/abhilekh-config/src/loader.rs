//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.abhilekh/config.toml`
//! 2. Local config: `.abhilekh/config.toml` (in working directory)
//! 3. Programmatic overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{AbhilekhConfig, ConfigOverrides};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name (both global and local).
const CONFIG_DIR: &str = ".abhilekh";

/// Configuration loader with global-config caching.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.abhilekh`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<AbhilekhConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.abhilekh`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a working directory.
    pub fn local_config_path(&self, working_dir: &Path) -> PathBuf {
        working_dir.join(CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration with optional overrides.
    ///
    /// Merges config in order: defaults → global → local → overrides,
    /// then validates the result. File merging is table-deep: a local file
    /// that only sets `[elasticsearch] url` keeps the global file's other
    /// sections intact.
    pub fn load(
        &mut self,
        working_dir: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<AbhilekhConfig, ConfigError> {
        let mut merged = toml::Value::try_from(AbhilekhConfig::default())?;

        if let Some(global_path) = self.global_config_path() {
            if global_path.exists() {
                debug!("Loading global config from {:?}", global_path);
                merge_value(&mut merged, load_value(&global_path)?);
            } else {
                trace!("Global config not found at {:?}", global_path);
            }
        } else {
            debug!("No home directory found, skipping global config");
        }

        let local_path = self.local_config_path(working_dir);
        if local_path.exists() {
            debug!("Loading local config from {:?}", local_path);
            merge_value(&mut merged, load_value(&local_path)?);
        } else {
            trace!("Local config not found at {:?}", local_path);
        }

        let mut config: AbhilekhConfig = merged
            .try_into()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<AbhilekhConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a working directory.
    pub fn load_local(&self, working_dir: &Path) -> Result<Option<AbhilekhConfig>, ConfigError> {
        let local_path = self.local_config_path(working_dir);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Save configuration to the local config file for a working directory.
    pub fn save_local(
        &self,
        working_dir: &Path,
        config: &AbhilekhConfig,
    ) -> Result<(), ConfigError> {
        let local_path = self.local_config_path(working_dir);
        save_config_file(&local_path, config)
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<AbhilekhConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Load a configuration file as a raw TOML value (for merging).
fn load_value(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    content
        .parse::<toml::Value>()
        .map_err(|e| ConfigError::parse_toml(path, e))
}

/// Recursively merge `overlay` into `base`; overlay values win,
/// tables merge key-by-key.
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(base_value) => merge_value(base_value, overlay_value),
                    None => {
                        base_table.insert(key, overlay_value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &AbhilekhConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::write_file(parent.to_path_buf(), e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_files_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = ConfigLoader::with_global_dir(tmp.path().join("no-global"));

        let config = loader.load(tmp.path(), None).unwrap();
        assert_eq!(config.elasticsearch.url, "http://localhost:9200");
    }

    #[test]
    fn test_local_overrides_global() {
        let tmp = tempfile::tempdir().unwrap();
        let global_dir = tmp.path().join("home").join(CONFIG_DIR);
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join(CONFIG_FILE_NAME),
            "[elasticsearch]\nurl = \"http://global:9200\"\n",
        )
        .unwrap();

        let work_dir = tmp.path().join("work");
        let local_dir = work_dir.join(CONFIG_DIR);
        std::fs::create_dir_all(&local_dir).unwrap();
        std::fs::write(
            local_dir.join(CONFIG_FILE_NAME),
            "[elasticsearch]\nurl = \"http://local:9200\"\n",
        )
        .unwrap();

        let mut loader = ConfigLoader::with_global_dir(tmp.path().join("home").join(CONFIG_DIR));
        let config = loader.load(&work_dir, None).unwrap();
        assert_eq!(config.elasticsearch.url, "http://local:9200");
    }

    #[test]
    fn test_merge_is_table_deep() {
        let tmp = tempfile::tempdir().unwrap();
        let global_dir = tmp.path().join("home").join(CONFIG_DIR);
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join(CONFIG_FILE_NAME),
            "[embedding]\nmodel = \"custom-multilingual\"\n",
        )
        .unwrap();

        let work_dir = tmp.path().join("work");
        let local_dir = work_dir.join(CONFIG_DIR);
        std::fs::create_dir_all(&local_dir).unwrap();
        std::fs::write(
            local_dir.join(CONFIG_FILE_NAME),
            "[elasticsearch]\nurl = \"http://local:9200\"\n",
        )
        .unwrap();

        let mut loader = ConfigLoader::with_global_dir(global_dir);
        let config = loader.load(&work_dir, None).unwrap();
        // Local section applies, global section survives
        assert_eq!(config.elasticsearch.url, "http://local:9200");
        assert_eq!(config.embedding.model, "custom-multilingual");
    }

    #[test]
    fn test_overrides_win_over_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = ConfigLoader::with_global_dir(tmp.path().join("no-global"));

        let overrides = ConfigOverrides {
            elasticsearch_url: Some("http://flag:9200".to_string()),
            ..Default::default()
        };
        let config = loader.load(tmp.path(), Some(&overrides)).unwrap();
        assert_eq!(config.elasticsearch.url, "http://flag:9200");
    }

    #[test]
    fn test_save_and_reload_local() {
        let tmp = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::with_global_dir(tmp.path().join("no-global"));

        let mut config = AbhilekhConfig::default();
        config.server.bind_addr = "0.0.0.0:9000".to_string();
        loader.save_local(tmp.path(), &config).unwrap();

        let reloaded = loader.load_local(tmp.path()).unwrap().unwrap();
        assert_eq!(reloaded.server.bind_addr, "0.0.0.0:9000");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let local_dir = tmp.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&local_dir).unwrap();
        std::fs::write(local_dir.join(CONFIG_FILE_NAME), "not = [valid").unwrap();

        let loader = ConfigLoader::with_global_dir(tmp.path().join("no-global"));
        assert!(loader.load_local(tmp.path()).is_err());
    }
}
