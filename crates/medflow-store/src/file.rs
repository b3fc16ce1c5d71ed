//! File-backed backend
//!
//! Each key lives in its own file under the data directory. File names are the
//! hex-encoded key plus `.json`, so any key maps to a portable name. Every
//! write goes to its own uniquely named temporary sibling and is renamed into
//! place, so readers only ever see a complete value. Concurrent writers to one
//! key never share a temporary file; the last rename wins.

use crate::{check_key, KeyValueStore, StoreError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const EXTENSION: &str = "json";

/// Durable store rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the directory cannot be created
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    /// Directory holding the value files
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path holding `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{EXTENSION}", hex::encode(key.as_bytes())))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!(
            ".{}.{}.tmp",
            hex::encode(key.as_bytes()),
            Uuid::new_v4().simple()
        ))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let tmp = self.temp_path_for(key);
        let path = self.path_for(key);

        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::io(&path, e));
        }

        tracing::trace!(key, bytes = value.len(), "wrote value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_hex_encoded() {
        let store = FileStore {
            root: PathBuf::from("/data"),
        };
        assert_eq!(store.path_for("ab"), PathBuf::from("/data/6162.json"));
    }

    #[test]
    fn temp_names_are_unique_per_write() {
        let store = FileStore {
            root: PathBuf::from("/data"),
        };
        let a = store.temp_path_for("ab");
        let b = store.temp_path_for("ab");
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/data")));
        assert!(a.to_string_lossy().contains(".6162."));
    }
}
