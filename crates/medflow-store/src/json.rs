//! Typed JSON helpers on top of [`KeyValueStore`]

use crate::{KeyValueStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read and decode the JSON value under `key`
///
/// # Errors
/// - `StoreError::Decode` if the stored text is not a valid `T`
/// - any error of the backend
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` as JSON and store it under `key`
///
/// # Errors
/// - `StoreError::Encode` if `value` cannot be serialized
/// - any error of the backend
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw).await
}
