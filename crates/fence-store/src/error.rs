//! Error types for fence-store

use std::path::PathBuf;

/// Result type for fence-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fence-store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Invalid store key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The persisted blob under `key` is not a valid snapshot
    #[error("Malformed snapshot under {key:?}: {message}")]
    MalformedSnapshot { key: String, message: String },

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Backend refused the operation (quota, permissions, platform)
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
