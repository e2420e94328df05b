use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};
use super::state_config::StateConfig;
use directories::ProjectDirs;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_FILE_NAME: &str = "state.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Reads and writes the files under the teleview config directory.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// # Errors
    ///
    /// Returns `ConfigError` if the platform config directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::ConfigDirNotFound)?;

        Ok(Self { config_dir })
    }

    #[must_use]
    pub fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> Result<(), ConfigError> {
        if !self.config_dir.exists() {
            info!(path = %self.config_dir.display(), "Creating configuration directory");
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Loads `config.toml`, writing a default one on first run.
    ///
    /// A file that fails to parse is left untouched and defaults are used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or the default cannot be written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        self.ensure_config_dir()?;
        let config_path = path_override.map_or_else(
            || self.config_dir.join(CONFIG_FILE_NAME),
            Path::to_path_buf,
        );

        if !config_path.exists() {
            info!(path = %config_path.display(), "Config file not found, writing defaults");
            let default_config = AppConfig::default();
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            Self::write_atomic(&config_path, &default_config)?;
            return Ok(default_config);
        }

        Self::read_or_default(&config_path, "config")
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the state file exists but cannot be read.
    pub fn load_state(&self) -> Result<StateConfig, ConfigError> {
        let state_path = self.config_dir.join(STATE_FILE_NAME);
        if !state_path.exists() {
            return Ok(StateConfig::default());
        }
        Self::read_or_default(&state_path, "state")
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save_state(&self, state: &StateConfig) -> Result<(), ConfigError> {
        self.ensure_config_dir()?;
        let state_path = self.config_dir.join(STATE_FILE_NAME);
        debug!(path = %state_path.display(), "Saving state");
        Self::write_atomic(&state_path, state)
    }

    fn read_or_default<T>(path: &Path, kind: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str::<T>(&content).unwrap_or_else(|e| {
            warn!(error = %e, kind, "Failed to parse file, using defaults");
            T::default()
        }))
    }

    fn write_atomic<T: Serialize>(path: &Path, data: &T) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(data)?;

        let parent = path
            .parent()
            .ok_or_else(|| std::io::Error::other("path has no parent directory"))?;
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}
