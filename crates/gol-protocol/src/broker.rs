//! `Broker.*` request/response types — the control/query RPC surface.

use bincode::{Decode, Encode};

/// One request on the broker's RPC surface.
#[derive(Debug, Clone, Encode, Decode)]
pub enum BrokerRequest {
    /// Install a new world and start (or restart) the turn loop.
    Process {
        world: Vec<Vec<u8>>,
        width: u32,
        height: u32,
        turns: u32,
    },
    /// Fetch a turn-boundary-consistent snapshot of the world.
    GetWorld,
    /// Fetch the alive-cell count at the current snapshot.
    GetAliveCells,
    /// Pause the turn loop if running and not already paused.
    Pause,
    /// Resume the turn loop if paused.
    Resume,
    /// Stop the turn loop, retaining the world as-is.
    StopProcessing,
    /// Stop the turn loop and mark the broker as shut down.
    Shutdown,
}

/// One response on the broker's RPC surface.
#[derive(Debug, Clone, Encode, Decode)]
pub enum BrokerResponse {
    /// Ack for `Process` — the simulation proceeds asynchronously.
    Process,
    /// `world` is `None` until the first `Process` call installs one.
    World {
        world: Option<Vec<Vec<u8>>>,
        completed_turns: u32,
        processing: bool,
    },
    AliveCells { cells_count: u32, completed_turns: u32 },
    /// The turn at which the pause took effect (a no-op pause still
    /// reports the current turn).
    Pause { turn: u32 },
    Resume,
    StopProcessing,
    Shutdown,
}
