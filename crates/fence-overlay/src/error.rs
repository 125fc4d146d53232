//! Error types for fence-overlay

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Map element not found: {element_id}")]
    ElementNotFound { element_id: String },

    #[error("Failed to add marker: {message}")]
    MarkerFailed { message: String },

    #[error("Failed to add circle: {message}")]
    CircleFailed { message: String },
}
