//! Infrastructure layer for Funchat.
//!
//! Storage backends, the whole-collection [`CollectionStore`] implementing
//! [`funchat_core::ChatRepository`], the persisted identity pointer and
//! configuration loading.

pub mod collection_store;
pub mod config_service;
pub mod identity_pointer;
pub mod paths;
pub mod storage;

pub use crate::collection_store::CollectionStore;
pub use crate::config_service::ConfigService;
pub use crate::identity_pointer::IdentityPointer;
pub use crate::paths::FunchatPaths;
pub use crate::storage::{FileBackend, MemoryBackend, StorageBackend};
