//! Error types for the controller's external collaborators.

use thiserror::Error;

/// Result type for `gol-io` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed PGM header in {path}")]
    BadHeader { path: String },

    #[error("PGM body length mismatch in {path}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },

    #[error("keyboard source error: {0}")]
    Key(String),
}
