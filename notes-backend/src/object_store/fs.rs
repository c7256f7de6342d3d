use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use super::{validate_key, ObjectStore, ObjectStoreError};

const TMP_FILENAME_INFIX: &str = ".tmp.";

/// A local directory used as a bucket. Key `alice/summary.json` lives at
/// `<root>/alice/summary.json`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, ObjectStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        log::debug!("[OBJECT_STORE] Using bucket directory {}", root.display());
        Ok(Self { root })
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        let path = self.object_path(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(TMP_FILENAME_INFIX);
        tmp_name.push(Uuid::new_v4().hyphenated().to_string());
        let tmp_path = PathBuf::from(tmp_name);

        log::trace!(
            "[OBJECT_STORE] Writing {} bytes ({}) to {} via {}",
            bytes.len(),
            content_type,
            key,
            tmp_path.display()
        );
        fs::write(&tmp_path, bytes).await?;

        if let Err(e) = fs::rename(&tmp_path, &path).await {
            log::error!(
                "[OBJECT_STORE] Failed to rename {} to {}: {}",
                tmp_path.display(),
                path.display(),
                e
            );
            if let Err(e) = fs::remove_file(&tmp_path).await {
                log::error!(
                    "[OBJECT_STORE] Failed to remove tmp file {}: {}",
                    tmp_path.display(),
                    e
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
