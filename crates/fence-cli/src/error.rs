//! Error types for fence-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from fence-core
    #[error(transparent)]
    Core(#[from] fence_core::Error),

    /// Error from the native gateway
    #[error(transparent)]
    Native(#[from] fence_native::Error),

    /// Error from the map engine
    #[error(transparent)]
    Overlay(#[from] fence_overlay::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
