//! Core simulation types for the distributed Game of Life system.
//!
//! Holds the toroidal world grid, the pure B3/S23 evolution rule, and the
//! horizontal strip decomposition shared by the broker and the worker.
//! Nothing here is networked or async — that lives in `gol-protocol`,
//! `gol-broker`, and `gol-worker`.

pub mod error;
pub mod strip;
pub mod world;

pub use error::{Error, Result};
pub use strip::{StripRange, evolve_strip, extract_strip_with_ghosts, plan_strips};
pub use world::{ALIVE, Coord, DEAD, World};
