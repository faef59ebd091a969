//! Error types for gol-core.

use thiserror::Error;

/// Result type for gol-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or evolving a world.
#[derive(Debug, Error)]
pub enum Error {
    /// A strip's ghost-row height didn't match `endY - startY + 2`.
    #[error("malformed strip: expected {expected} rows (with ghosts), got {actual}")]
    MalformedStrip { expected: usize, actual: usize },

    /// A row in a strip or world didn't have exactly `width` columns.
    #[error("malformed row: expected {expected} columns, got {actual}")]
    MalformedRow { expected: usize, actual: usize },

    /// The grid's row count didn't match the declared height.
    #[error("malformed grid: expected {expected} rows, got {actual}")]
    MalformedGrid { expected: usize, actual: usize },
}
