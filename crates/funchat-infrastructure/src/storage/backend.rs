//! Storage backend trait.

use funchat_core::Result;

/// A flat key → text store, the local equivalent of browser storage.
///
/// Each persisted collection is one serialized blob under a stable key.
/// Implementations must be durable when `write` returns.
pub trait StorageBackend: Send + Sync {
    /// Reads the blob stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(text))`: blob found
    /// - `Ok(None)`: nothing stored under `key`
    /// - `Err(_)`: the backend could not be read
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the blob stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
