//! The broker's state machine.
//!
//! What used to be four independent booleans (`processing`, `paused`,
//! `stop`, `shutdown`) are collapsed into one [`BrokerPhase`]; the
//! booleans are kept as derived accessors so RPC responses are
//! unaffected.

use gol_core::World;

/// One of the five reachable broker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerPhase {
    Idle,
    Running,
    Paused,
    Stopping,
    ShuttingDown,
}

impl BrokerPhase {
    /// The externally-reported `processing` flag (`GetWorld`/
    /// `GetAliveCells`). `StopProcessing`/`Shutdown` move the phase out
    /// of `Running`/`Paused` synchronously, as part of the call itself,
    /// so `processing` is observably `false` the moment either returns —
    /// even though the background turn-loop task may still be mid-fanout
    /// for a little longer. See [`BrokerState::turn_loop_running`] for
    /// the flag that actually tracks the task's liveness.
    pub fn processing(self) -> bool {
        matches!(self, BrokerPhase::Running | BrokerPhase::Paused)
    }

    pub fn paused(self) -> bool {
        matches!(self, BrokerPhase::Paused)
    }

    pub fn stop(self) -> bool {
        matches!(self, BrokerPhase::Stopping | BrokerPhase::ShuttingDown)
    }

    pub fn shutdown(self) -> bool {
        matches!(self, BrokerPhase::ShuttingDown)
    }
}

/// The broker's authoritative, mutex-guarded state.
pub struct BrokerState {
    pub world: World,
    pub turn: u32,
    pub total_turns: u32,
    pub phase: BrokerPhase,
    /// Becomes `true` on the first `Process` call. `GetWorld` reports
    /// `None` for the world until then, since a zero-sized placeholder
    /// grid is not a meaningful simulation snapshot.
    pub ever_processed: bool,
    /// `true` while a background turn-loop task is alive for the
    /// current simulation, from the moment `Process` spawns it until the
    /// task itself clears this flag right before returning. Unlike
    /// `phase.processing()`, this does not flip the instant
    /// `StopProcessing`/`Shutdown` is called — it tracks the task, not
    /// the reported flag, so `Process`'s drain-and-wait logic knows when
    /// it is actually safe to install a new world.
    pub turn_loop_running: bool,
}

impl BrokerState {
    pub fn new() -> Self {
        Self {
            world: World::new_dead(0, 0),
            turn: 0,
            total_turns: 0,
            phase: BrokerPhase::Idle,
            ever_processed: false,
            turn_loop_running: false,
        }
    }
}

impl Default for BrokerState {
    fn default() -> Self {
        Self::new()
    }
}
