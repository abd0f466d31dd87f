mod backend;

pub use backend::{FileBackend, MemoryBackend, Result, StorageBackend, StorageError};
