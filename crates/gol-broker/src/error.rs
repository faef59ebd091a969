//! Error types for the broker's worker-side RPC client and control surface.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to dial worker at {addr}: {source}")]
    WorkerDial {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Protocol(#[from] gol_protocol::Error),

    #[error(transparent)]
    Core(#[from] gol_core::Error),

    #[error("worker at {addr} returned a malformed-strip response: {message}")]
    WorkerRejectedStrip { addr: String, message: String },
}
