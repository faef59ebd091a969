//! `GolWorker.CalculateNextState` request/response types.

use bincode::{Decode, Encode};

/// Request to evolve one ghost-padded strip by one turn.
#[derive(Debug, Clone, Encode, Decode)]
pub struct WorkerRequest {
    /// First row (inclusive) this worker owns, in the full world.
    pub start_y: u32,
    /// One past the last row (exclusive) this worker owns.
    pub end_y: u32,
    /// `end_y - start_y + 2` rows: one ghost row above, the owned rows,
    /// one ghost row below.
    pub world_slice: Vec<Vec<u8>>,
    pub image_width: u32,
    pub image_height: u32,
}

/// Response to [`WorkerRequest`].
#[derive(Debug, Clone, Encode, Decode)]
pub enum WorkerResponse {
    /// `end_y - start_y` evolved rows, in order.
    Ok { world_slice: Vec<Vec<u8>> },
    /// The request's strip was mis-sized (`MalformedStrip` / `MalformedRow`).
    MalformedStrip { message: String },
}
