//! Error types for fence-core

use fence_meta::FenceId;

/// Result type for fence-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fence-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operation referenced an id absent from the live collection
    #[error("Geofence not found: {id}")]
    NotFound { id: FenceId },

    /// A geofence already exists at this center
    #[error("Geofence already exists: {id}")]
    DuplicateFence { id: FenceId },

    /// The geofence is being removed and cannot change
    #[error("Geofence {id} is being removed")]
    FenceBusy { id: FenceId },

    /// Invalid settings
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Transparent wrappers for underlying crate errors
    /// Schema validation error from fence-meta
    #[error(transparent)]
    Meta(#[from] fence_meta::Error),

    /// Persistence error from fence-store
    #[error(transparent)]
    Store(#[from] fence_store::Error),

    /// Native engine error from fence-native
    #[error(transparent)]
    Native(#[from] fence_native::Error),

    /// Map error from fence-overlay
    #[error(transparent)]
    Overlay(#[from] fence_overlay::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
