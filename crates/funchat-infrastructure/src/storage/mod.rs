//! Key-based blob storage backing the persisted collections.

mod atomic_file;
mod backend;
mod file_backend;
mod memory_backend;

pub use atomic_file::AtomicFile;
pub use backend::StorageBackend;
pub use file_backend::FileBackend;
pub use memory_backend::MemoryBackend;
