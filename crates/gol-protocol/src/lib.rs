//! Wire protocol shared by the broker, the worker, and the controller.
//!
//! Both RPC surfaces (`Broker.*` and `GolWorker.CalculateNextState`) are
//! plain enums, framed with [`frame::write_message`] /
//! [`frame::read_message`] over a `TcpStream`. There is no notion of a
//! connection-level method dispatch table — each side just reads one
//! request enum and writes back the matching response enum.

pub mod broker;
pub mod error;
pub mod frame;
pub mod worker;

pub use broker::{BrokerRequest, BrokerResponse};
pub use error::{Error, Result};
pub use frame::{read_message, write_message};
pub use worker::{WorkerRequest, WorkerResponse};

/// Default TCP port the broker listens on.
pub const DEFAULT_BROKER_PORT: u16 = 8030;
/// Default TCP port a worker listens on.
pub const DEFAULT_WORKER_PORT: u16 = 8031;
