//! Object store boundary: key-addressed blob storage.
//!
//! The note store only needs get/put/delete of opaque bytes. No conditional
//! writes and no multi-key transactions are assumed; every `put` is an
//! unconditional last-writer-wins overwrite of a single key.

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("invalid object key \"{0}\"")]
    InvalidKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the blob at `key`. `Ok(None)` means the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError>;

    /// Store `bytes` at `key`, replacing whatever was there.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), ObjectStoreError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
}

/// Reject keys that could escape their prefix once mapped onto a path.
pub fn validate_key(key: &str) -> Result<(), ObjectStoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if valid {
        Ok(())
    } else {
        Err(ObjectStoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("alice/summary.json").is_ok());
        assert!(validate_key("alice/0f8fad5b-d9cb-469f-a165-70867728950e.json").is_ok());

        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("../summary.json").is_err());
        assert!(validate_key("alice/../bob/summary.json").is_err());
        assert!(validate_key("alice//summary.json").is_err());
        assert!(validate_key("./summary.json").is_err());
        assert!(validate_key("alice\\summary.json").is_err());
    }
}
