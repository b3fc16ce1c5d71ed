//! Identity session
//!
//! The session is a single well-known key holding the serialized
//! [`Identity`] of the logged-in user. Nothing else writes that key.

use crate::keys::SESSION_KEY;
use crate::types::Identity;
use medflow_store::{read_json, write_json, SharedStore, StoreError};

/// Access to the current authenticated identity
#[derive(Debug, Clone)]
pub struct Session {
    store: SharedStore,
}

impl Session {
    /// Create session over `store`
    #[inline]
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Current identity, `None` when unauthenticated
    ///
    /// A value that cannot be read or decoded counts as no session.
    pub async fn resolve(&self) -> Option<Identity> {
        match read_json::<Identity>(self.store.as_ref(), SESSION_KEY).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable session");
                None
            }
        }
    }

    /// Persist `identity` as the current session
    ///
    /// # Errors
    /// Returns the store error if the session cannot be written
    pub async fn start(&self, identity: &Identity) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), SESSION_KEY, identity).await?;
        tracing::info!(cc = %identity.id, "session started");
        Ok(())
    }

    /// Drop the current session; idempotent
    ///
    /// # Errors
    /// Returns the store error if the key cannot be removed
    pub async fn end(&self) -> Result<(), StoreError> {
        self.store.remove(SESSION_KEY).await?;
        tracing::info!("session ended");
        Ok(())
    }
}
