//! Error types for the wire protocol.

use thiserror::Error;

/// Result type for protocol encode/decode/IO operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while framing or transporting a message.
#[derive(Debug, Error)]
pub enum Error {
    /// The connection was closed or otherwise failed.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame declared a length larger than the sanity cap.
    #[error("frame too large: {len} bytes (cap is {cap} bytes)")]
    FrameTooLarge { len: usize, cap: usize },

    /// Failed to bincode-encode an outgoing message.
    #[error("encode error: {0}")]
    Encode(String),

    /// Failed to bincode-decode an incoming message.
    #[error("decode error: {0}")]
    Decode(String),
}
