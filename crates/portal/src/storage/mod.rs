//! Persistence boundary: a key-value store of JSON blobs, one key per
//! collection.
//!
//! An absent key is not an error; the record store reads it as an empty
//! collection.

use async_trait::async_trait;

use crate::error::StorageError;

pub mod filesystem;
pub mod memory;

pub use filesystem::FileStore;
pub use memory::MemoryStore;

/// Key-value backend holding serialized collections.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the blob stored under `key`, or `None` when the key is absent.
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the blob stored under `key`.
    async fn write(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Lists the keys currently present, sorted.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Rejects `value` if it would exceed `quota` bytes.
pub(crate) fn check_quota(
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> Result<(), StorageError> {
    match quota {
        Some(limit) if value.len() > limit => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            limit,
            attempted: value.len(),
        }),
        _ => Ok(()),
    }
}
