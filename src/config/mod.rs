//! Persistent settings for the undo/redo history.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::{
    paths,
    persistence::{self, PersistError},
};

pub const MIN_UNDO_LIMIT: usize = 10;
pub const MAX_UNDO_LIMIT: usize = 100;
pub const DEFAULT_UNDO_LIMIT: usize = 25;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<PersistError> for ConfigError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::Io(io) => ConfigError::Io(io),
            PersistError::Serde(serde) => ConfigError::Serde(serde.to_string()),
        }
    }
}

/// User-configurable history settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_undo_limit")]
    pub undo_limit: usize,
    /// Overrides the default `<data dir>/undo_history.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    /// Whether delete commands built by the shell soft-delete records.
    #[serde(default)]
    pub soft_delete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_project: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            history_file: None,
            soft_delete: false,
            last_project: None,
        }
    }
}

impl HistoryConfig {
    pub fn default_undo_limit() -> usize {
        DEFAULT_UNDO_LIMIT
    }

    /// The configured limit clamped into the supported range.
    pub fn effective_undo_limit(&self) -> usize {
        clamp_depth(self.undo_limit)
    }

    pub fn resolve_history_file(&self, base: &Path) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| paths::history_file_in(base))
    }
}

/// Clamps a requested history depth into `[MIN_UNDO_LIMIT, MAX_UNDO_LIMIT]`.
pub fn clamp_depth(depth: usize) -> usize {
    depth.clamp(MIN_UNDO_LIMIT, MAX_UNDO_LIMIT)
}

/// Handles persistence for [`HistoryConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        persistence::ensure_dir(&base)?;
        Ok(Self {
            config_path: paths::config_file_in(&base),
            base_dir: base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<HistoryConfig, ConfigError> {
        Ok(persistence::load_json(&self.config_path)?.unwrap_or_default())
    }

    pub fn save(&self, config: &HistoryConfig) -> Result<(), ConfigError> {
        persistence::save_json(config, &self.config_path)?;
        Ok(())
    }

    pub fn history_file(&self, config: &HistoryConfig) -> PathBuf {
        config.resolve_history_file(&self.base_dir)
    }
}
