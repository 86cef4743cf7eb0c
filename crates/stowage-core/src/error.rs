//! Error types for the stowage core library.

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the storage facade and its collaborators.
#[derive(Error, Debug)]
pub enum Error {
    /// Object or bucket absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed key or bucket name
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient remote/provider failure
    #[error("backend error: {0}")]
    Backend(String),

    /// Cooperative cancellation, distinct from failure
    #[error("operation cancelled")]
    Cancelled,

    /// IO error while staging caller-supplied input
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error only signals an absent object or container.
    ///
    /// Read paths translate these to `None`/`false`/empty results instead of
    /// propagating them.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
