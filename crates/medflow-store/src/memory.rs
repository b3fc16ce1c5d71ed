//! In-memory backend

use crate::{check_key, KeyValueStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Volatile store backed by a `HashMap`
///
/// Values are lost when the store is dropped. Clones are not shared; wrap in
/// an `Arc` to hand one instance to several components.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store pre-populated with entries
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of keys present
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no key is present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Raw value under `key`, bypassing the async interface
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Raw write, bypassing the async interface
    pub fn put_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_set_get_remove() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());

        store.set("a", "1").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

        store.set("a", "2").await.unwrap();
        assert_eq!(store.peek("a").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove("a").await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());

        // Second remove is a no-op
        assert!(store.remove("a").await.is_ok());
    }

    #[tokio::test]
    async fn memory_rejects_empty_key() {
        let store = InMemoryStore::new();
        let result = store.set("", "x").await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn memory_with_entries() {
        let store = InMemoryStore::with_entries([("k", "v")]);
        assert_eq!(store.peek("k").as_deref(), Some("v"));
    }
}
