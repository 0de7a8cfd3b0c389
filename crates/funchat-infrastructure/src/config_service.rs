//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` (by default
//! `~/.config/funchat/config.toml`) and applies environment overrides.

use crate::paths::FunchatPaths;
use crate::storage::AtomicFile;
use funchat_core::config::AppConfig;
use funchat_core::{ChatError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Overrides `storage.data_dir`.
pub const DATA_DIR_ENV: &str = "FUNCHAT_DATA_DIR";
/// Overrides `logging.level`.
pub const LOG_ENV: &str = "FUNCHAT_LOG";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicFile,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default config path.
    pub fn default_location() -> Result<Self> {
        Ok(Self::with_path(FunchatPaths::config_file()?))
    }

    /// Creates a service reading `path` (for custom locations and tests).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing file yields the defaults; a malformed file is an error so
    /// that typos are not silently ignored.
    pub fn get_config(&self) -> Result<AppConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Configuration with [`DATA_DIR_ENV`] and [`LOG_ENV`] applied.
    pub fn get_effective_config(&self) -> Result<AppConfig> {
        let config = self.get_config()?;
        Ok(apply_overrides(config, |key| std::env::var(key).ok()))
    }

    /// Writes `config` to the file and refreshes the cache.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let content = toml::to_string_pretty(config)?;
        self.file.save(&content)?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    fn load_config(&self) -> Result<AppConfig> {
        match self.file.load()? {
            Some(content) => toml::from_str(&content).map_err(|e| {
                ChatError::config(format!(
                    "Failed to parse {}: {}",
                    self.file.path().display(),
                    e
                ))
            }),
            None => {
                tracing::debug!(
                    "[Config] No config at {}, using defaults",
                    self.file.path().display()
                );
                Ok(AppConfig::default())
            }
        }
    }
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        config.storage.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
        config.logging.level = level;
    }
    config
}

/// The data directory from `config`, or the platform default.
pub fn resolve_data_dir(config: &AppConfig) -> Result<PathBuf> {
    match &config.storage.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => FunchatPaths::data_dir(),
    }
}
