//! Error types for the card engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for card operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or rendering cards
#[derive(Error, Debug)]
pub enum Error {
    /// The renderer could not be constructed
    #[error("Renderer initialization failed: {0}")]
    InitializationError(String),

    /// A font asset is missing or unreadable
    #[error("Failed to load font {path:?}: {reason}")]
    FontError { path: PathBuf, reason: String },

    /// Network error while fetching a remote asset
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Bytes could not be decoded as an image
    #[error("Image decode failed: {0}")]
    DecodeError(String),

    /// Failed to rasterize or encode the card
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Uploaded asset could not be stored
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Record could not be saved or loaded
    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(e) => Error::DecodeError(e.to_string()),
            image::ImageError::Unsupported(e) => Error::DecodeError(e.to_string()),
            other => Error::RenderError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::RepositoryError(err.to_string())
    }
}
