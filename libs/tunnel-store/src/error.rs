//! Error types for the tunnel store and its storage backends.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The backing file exists but cannot be parsed.
    #[error("corrupt state file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The backing file was written by an incompatible format version.
    #[error("unsupported state file version: found {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Errors from tunnel store operations.
#[derive(Debug, Error)]
pub enum TunnelStoreError {
    /// The connection info could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying medium failed or is unreadable.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// A slot holds a value that does not decode to its type.
    ///
    /// `detail` never carries the raw connection info, which may hold
    /// credentials.
    #[error("corrupt value in slot '{key}': {detail}")]
    CorruptSlot { key: &'static str, detail: String },

    /// A connection info record is not a usable tunnel config.
    #[error("invalid tunnel config: {0}")]
    InvalidConfig(String),
}

impl TunnelStoreError {
    /// Returns true if the error came from the storage medium itself.
    pub fn is_storage(&self) -> bool {
        matches!(self, TunnelStoreError::StorageUnavailable(_))
    }

    /// Returns true if persisted data was found but could not be decoded.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            TunnelStoreError::CorruptSlot { .. }
                | TunnelStoreError::StorageUnavailable(StorageError::Corrupt { .. })
        )
    }
}
