//! A persistent connection to one worker, held open for the broker's
//! whole lifetime: dialed once at startup and reused for every turn.

use gol_protocol::{WorkerRequest, WorkerResponse, read_message, write_message};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// One worker's RPC channel. Calls are serialized through an internal
/// mutex since a single `TcpStream` can't interleave concurrent
/// request/response pairs.
pub struct WorkerClient {
    addr: String,
    stream: Mutex<TcpStream>,
}

impl WorkerClient {
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| Error::WorkerDial {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self {
            addr: addr.to_string(),
            stream: Mutex::new(stream),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Evolve one strip on this worker. Returns the evolved rows, or an
    /// error if the worker rejected the strip or the connection failed.
    pub async fn calculate_next_state(&self, request: WorkerRequest) -> Result<Vec<Vec<u8>>> {
        debug!(addr = %self.addr, start_y = request.start_y, end_y = request.end_y, "calling worker");
        let mut stream = self.stream.lock().await;
        write_message(&mut *stream, &request).await?;
        let response: WorkerResponse = read_message(&mut *stream).await?;
        match response {
            WorkerResponse::Ok { world_slice } => Ok(world_slice),
            WorkerResponse::MalformedStrip { message } => Err(Error::WorkerRejectedStrip {
                addr: self.addr.clone(),
                message,
            }),
        }
    }
}
