//! MedFlow Store - persistent string-keyed storage
//!
//! The appointment core treats storage as an opaque key-value collaborator:
//! - `get` / `set` / `remove` on text values
//! - no transactions, no compare-and-swap
//! - values survive restarts when the backend is durable
//!
//! Two backends are provided:
//! - [`InMemoryStore`] for tests and ephemeral sessions
//! - [`FileStore`] keeping one file per key inside a data directory
//!
//! # Example
//!
//! ```rust,ignore
//! use medflow_store::{InMemoryStore, KeyValueStore};
//!
//! # async fn example() -> Result<(), medflow_store::StoreError> {
//! let store = InMemoryStore::new();
//! store.set("mf_user", "{}").await?;
//! assert_eq!(store.get("mf_user").await?.as_deref(), Some("{}"));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod file;
pub mod json;
pub mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use json::{read_json, write_json};
pub use memory::InMemoryStore;

use async_trait::async_trait;
use std::sync::Arc;

/// Opaque string-keyed storage
///
/// Implementations give no atomicity across keys and no coordination between
/// concurrent writers: the last `set` on a key wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Shared handle used by every component touching the store
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
