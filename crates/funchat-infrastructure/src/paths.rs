//! Path management for funchat configuration and data files.
//!
//! ```text
//! ~/.config/funchat/           # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # Responder API key
//!
//! ~/.local/share/funchat/      # Data directory
//! ├── chat_app_users.json
//! ├── chat_app_conversations.json
//! └── chat_app_messages.json
//! ```

use funchat_core::{ChatError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "funchat";

/// Platform-specific locations, resolved with the `dirs` crate.
pub struct FunchatPaths;

impl FunchatPaths {
    /// Returns the funchat configuration directory (e.g. `~/.config/funchat/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ChatError::config("Cannot find config directory"))
    }

    /// Returns the funchat data directory (e.g. `~/.local/share/funchat/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ChatError::config("Cannot find data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path to `secret.json`.
    ///
    /// # Security Note
    ///
    /// The file holds the responder API key; keep it readable by the owner
    /// only.
    pub fn secret_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
