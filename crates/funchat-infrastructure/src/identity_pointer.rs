//! Persisted pointer to the signed-in identity.

use crate::storage::StorageBackend;
use funchat_core::Result;
use std::sync::Arc;

pub const CURRENT_USER_KEY: &str = "chat_app_current_user_id";

/// Remembers which user id was last signed in, so a restarted front end can
/// resume the session without asking again.
#[derive(Clone)]
pub struct IdentityPointer {
    backend: Arc<dyn StorageBackend>,
}

impl IdentityPointer {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The remembered user id, if any.
    ///
    /// Unreadable or malformed pointers read as "signed out".
    pub fn get(&self) -> Option<String> {
        match self.backend.read(CURRENT_USER_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<String>(&raw)
                .map_err(|e| tracing::warn!("[Identity] Ignoring malformed pointer: {}", e))
                .ok()
                .filter(|id| !id.is_empty()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("[Identity] Failed to read pointer: {}", e);
                None
            }
        }
    }

    pub fn set(&self, user_id: &str) -> Result<()> {
        let raw = serde_json::to_string(user_id)?;
        self.backend.write(CURRENT_USER_KEY, &raw)
    }

    pub fn clear(&self) -> Result<()> {
        self.backend.remove(CURRENT_USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    #[test]
    fn test_set_get_clear() {
        let pointer = IdentityPointer::new(Arc::new(MemoryBackend::new()));
        assert_eq!(pointer.get(), None);

        pointer.set("u1").unwrap();
        assert_eq!(pointer.get().as_deref(), Some("u1"));

        pointer.clear().unwrap();
        assert_eq!(pointer.get(), None);
    }

    #[test]
    fn test_malformed_pointer_reads_as_signed_out() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        backend.write(CURRENT_USER_KEY, "u1-without-quotes").unwrap();

        assert_eq!(IdentityPointer::new(backend).get(), None);
    }
}
