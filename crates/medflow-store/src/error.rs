//! Error types for the key-value store

use std::path::PathBuf;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key rejected by the backend
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// Filesystem failure
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Value could not be encoded
    #[error("failed to encode value for {key}: {source}")]
    Encode {
        /// Target key
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Stored value could not be decoded
    #[error("malformed value under {key}: {source}")]
    Decode {
        /// Source key
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether the stored data itself is bad (as opposed to the medium failing)
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
