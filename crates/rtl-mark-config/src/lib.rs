use rtl_mark_engine::host::{KeyValueStore, keys};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Persisted settings file. Missing fields (and a missing file) mean the
/// documented defaults: everything enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub global_enabled: bool,
    pub use_alt_font: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_enabled: true,
            use_alt_font: true,
        }
    }
}

impl Settings {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let settings: Settings =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(settings))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/rtl-mark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }
}

/// File-backed settings store: the persisted binding of the engine's
/// [`KeyValueStore`]. Reads come from the in-memory copy; every write saves
/// the whole file. A failed save keeps the in-memory value so the running
/// session stays consistent, and logs the failure.
#[derive(Debug)]
pub struct FileStore {
    settings: Settings,
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`, reading the current file if present.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let settings = Settings::load_from_path(&path)?.unwrap_or_default();
        Ok(Self { settings, path })
    }

    /// Open the store at the default config path.
    pub fn open_default() -> Result<Self, ConfigError> {
        Self::open(Settings::config_path())
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    fn persist(&self) {
        if let Err(err) = self.settings.save_to_path(&self.path) {
            tracing::warn!(path = %self.path.display(), %err, "failed to persist settings");
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            keys::GLOBAL_ENABLED => Some(&mut self.settings.global_enabled),
            keys::USE_ALT_FONT => Some(&mut self.settings.use_alt_font),
            _ => None,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            keys::GLOBAL_ENABLED => Some(self.settings.global_enabled),
            keys::USE_ALT_FONT => Some(self.settings.use_alt_font),
            _ => None,
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        if let Some(field) = self.field_mut(key) {
            *field = value;
            self.persist();
        }
    }

    fn remove(&mut self, key: &str) {
        let defaults = Settings::default();
        let reset = match key {
            keys::GLOBAL_ENABLED => Some(defaults.global_enabled),
            keys::USE_ALT_FONT => Some(defaults.use_alt_font),
            _ => None,
        };
        if let Some(value) = reset
            && let Some(field) = self.field_mut(key)
        {
            *field = value;
            self.persist();
        }
    }
}
