//! Error types for fence-native

use std::path::PathBuf;

use fence_meta::FenceId;

use crate::Platform;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Geofencing is not available on {platform}")]
    UnsupportedPlatform { platform: Platform },

    #[error("Native geofence engine used before init")]
    NotInitialized,

    #[error("Location permission denied: {message}")]
    Permission { message: String },

    #[error("Native engine rejected {id}: {message}")]
    Platform { id: FenceId, message: String },

    #[error("Native engine I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Native engine state is corrupt: {0}")]
    State(#[from] serde_json::Error),
}

impl Error {
    pub fn platform(id: &FenceId, message: impl Into<String>) -> Self {
        Self::Platform {
            id: id.clone(),
            message: message.into(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    /// Whether retrying the same call later can succeed without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Platform { .. } | Self::Io { .. })
    }
}
