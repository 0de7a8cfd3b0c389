//! Directory-based storage backend.

use super::atomic_file::AtomicFile;
use super::backend::StorageBackend;
use funchat_core::{ChatError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each key as `<dir>/<key>.json`.
///
/// Directory structure:
/// ```text
/// data_dir/
/// ├── chat_app_users.json
/// ├── chat_app_conversations.json
/// ├── chat_app_messages.json
/// └── chat_app_current_user_id.json
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens (and creates if needed) the backend directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            ChatError::storage(format!(
                "Failed to create data directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        tracing::debug!("[FileBackend] Using data directory {}", dir.display());
        Ok(Self { dir })
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ChatError::storage(format!("Invalid storage key '{key}'")));
        }
        Ok(AtomicFile::new(self.dir.join(format!("{key}.json"))))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file_for(key)?.load()?)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        Ok(self.file_for(key)?.save(value)?)
    }

    fn remove(&self, key: &str) -> Result<()> {
        Ok(self.file_for(key)?.remove()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_keys_map_to_json_files() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path()).unwrap();

        backend.write("chat_app_users", "[]").unwrap();

        assert!(temp_dir.path().join("chat_app_users.json").exists());
        assert_eq!(backend.read("chat_app_users").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path()).unwrap();

        assert!(backend.write("../escape", "x").is_err());
        assert!(backend.read("").is_err());
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("b");

        let backend = FileBackend::new(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(backend.read("chat_app_messages").unwrap(), None);
    }
}
