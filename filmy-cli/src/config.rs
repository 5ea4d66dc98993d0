use crate::error::{AppError, Result};
use filmy_player::PlayerConfig;
use filmy_resolver::config::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub resolver: ResolverConfig,
    pub player: PlayerConfig,
}

impl AppConfig {
    /// Default location: `<config dir>/filmy/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("filmy").join("config.toml"))
            .ok_or_else(|| AppError::NotFound("user config directory".to_string()))
    }

    fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Loads the config file, falling back to defaults when it does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve_path(path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.show()?)?;
        Ok(path)
    }

    /// Overwrites the config file with defaults.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        Self::default().save(path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
