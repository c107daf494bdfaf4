//! Key-value persistence for the player profile
//!
//! Features:
//! - `KeyValueStore` boundary so hosts can plug in their own storage
//! - In-memory store for tests and headless runs
//! - JSON file store with tmp-file swap on every write
//! - Per-field corruption recovery when reading the profile

mod profile;
mod store;

pub use profile::{DEFAULT_CHARACTER, PersistedProfile, keys};
pub use store::{JsonFileStore, MemoryStore};

/// Errors from a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key-value storage
///
/// Writes are expected to be cheap; callers treat failures as non-fatal.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
