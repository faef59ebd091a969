//! The broker: owns the authoritative world, drives the turn loop, and
//! fans strips out to workers every turn.
//!
//! One [`Broker`] handle is cloneable and shareable across connection
//! tasks; the state machine itself lives behind one `tokio::sync::Mutex`
//! (see [`state::BrokerState`]), matching the single-mutex-per-broker
//! design the turn loop and control RPCs both rely on.

pub mod error;
pub mod state;
pub mod worker_client;

use std::sync::Arc;
use std::time::Duration;

use gol_core::{DEAD, World, extract_strip_with_ghosts, plan_strips};
use gol_protocol::{BrokerRequest, BrokerResponse, WorkerRequest};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub use error::{Error, Result};
use state::{BrokerPhase, BrokerState};
use worker_client::WorkerClient;

/// How long the `Process`-drain wait and the paused-poll fallback sleep
/// for.
const DRAIN_POLL: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct Broker {
    state: Arc<Mutex<BrokerState>>,
    workers: Arc<Vec<WorkerClient>>,
    notify: Arc<Notify>,
}

impl Broker {
    /// Dial every worker address up front. A failed dial is fatal — the
    /// broker has no degraded mode for a missing worker.
    pub async fn connect(worker_addrs: &[String]) -> Result<Self> {
        let mut workers = Vec::with_capacity(worker_addrs.len());
        for addr in worker_addrs {
            info!(%addr, "dialing worker");
            workers.push(WorkerClient::connect(addr).await?);
        }
        Ok(Self {
            state: Arc::new(Mutex::new(BrokerState::new())),
            workers: Arc::new(workers),
            notify: Arc::new(Notify::new()),
        })
    }

    /// Dispatch one request on the broker's RPC surface.
    pub async fn handle(&self, request: BrokerRequest) -> BrokerResponse {
        match request {
            BrokerRequest::Process {
                world,
                width,
                height,
                turns,
            } => {
                self.process(world, width, height, turns).await;
                BrokerResponse::Process
            }
            BrokerRequest::GetWorld => self.get_world().await,
            BrokerRequest::GetAliveCells => self.get_alive_cells().await,
            BrokerRequest::Pause => self.pause().await,
            BrokerRequest::Resume => {
                self.resume().await;
                BrokerResponse::Resume
            }
            BrokerRequest::StopProcessing => {
                self.stop_processing().await;
                BrokerResponse::StopProcessing
            }
            BrokerRequest::Shutdown => {
                self.shutdown().await;
                BrokerResponse::Shutdown
            }
        }
    }

    pub async fn process(&self, world: Vec<Vec<u8>>, width: u32, height: u32, turns: u32) {
        {
            let mut state = self.state.lock().await;
            if state.turn_loop_running {
                state.phase = BrokerPhase::Stopping;
                drop(state);
                self.notify.notify_waiters();
                self.wait_until_idle().await;
            }
        }

        let new_world = match World::from_rows(width as usize, height as usize, world) {
            Ok(world) => world,
            Err(err) => {
                warn!(%err, "Process received a malformed world, ignoring the request");
                return;
            }
        };

        let phase = if turns == 0 {
            BrokerPhase::Idle
        } else {
            BrokerPhase::Running
        };

        {
            let mut state = self.state.lock().await;
            state.world = new_world;
            state.turn = 0;
            state.total_turns = turns;
            state.phase = phase;
            state.ever_processed = true;
            state.turn_loop_running = turns > 0;
        }

        info!(width, height, turns, "starting simulation");

        if turns > 0 {
            let state = self.state.clone();
            let workers = self.workers.clone();
            let notify = self.notify.clone();
            tokio::spawn(async move {
                run_turn_loop(state, workers, notify).await;
            });
        }
    }

    /// Wait for the background turn-loop task itself to exit — not for
    /// `processing` to read `false`, which (per `StopProcessing`'s
    /// synchronous contract) can already be true while the task is
    /// still draining its last in-flight fan-out.
    async fn wait_until_idle(&self) {
        loop {
            if !self.state.lock().await.turn_loop_running {
                return;
            }
            tokio::time::sleep(DRAIN_POLL).await;
        }
    }

    pub async fn get_world(&self) -> BrokerResponse {
        let state = self.state.lock().await;
        let world = state.ever_processed.then(|| state.world.rows().to_vec());
        BrokerResponse::World {
            world,
            completed_turns: state.turn,
            processing: state.phase.processing(),
        }
    }

    pub async fn get_alive_cells(&self) -> BrokerResponse {
        let state = self.state.lock().await;
        BrokerResponse::AliveCells {
            cells_count: state.world.alive_count() as u32,
            completed_turns: state.turn,
        }
    }

    pub async fn pause(&self) -> BrokerResponse {
        let mut state = self.state.lock().await;
        if state.phase == BrokerPhase::Running {
            state.phase = BrokerPhase::Paused;
        }
        BrokerResponse::Pause { turn: state.turn }
    }

    pub async fn resume(&self) {
        let mut state = self.state.lock().await;
        if state.phase == BrokerPhase::Paused {
            state.phase = BrokerPhase::Running;
            drop(state);
            self.notify.notify_waiters();
        }
    }

    pub async fn stop_processing(&self) {
        let mut state = self.state.lock().await;
        if state.phase != BrokerPhase::ShuttingDown {
            state.phase = BrokerPhase::Stopping;
        }
        drop(state);
        self.notify.notify_waiters();
    }

    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.phase = BrokerPhase::ShuttingDown;
        drop(state);
        self.notify.notify_waiters();
    }
}

/// The background turn-loop task spawned by each `Process` call. Clears
/// `turn_loop_running` as the very last thing it does on every exit
/// path, so `Process`'s drain-wait (`wait_until_idle`) knows the task
/// has actually gone away rather than just that `processing` reads
/// `false`.
async fn run_turn_loop(state: Arc<Mutex<BrokerState>>, workers: Arc<Vec<WorkerClient>>, notify: Arc<Notify>) {
    let total_turns = state.lock().await.total_turns;

    for t in 0..total_turns {
        loop {
            let mut guard = state.lock().await;
            let phase = guard.phase;
            if phase.stop() {
                debug!(turn = t, "turn loop stopping");
                if guard.phase != BrokerPhase::ShuttingDown {
                    guard.phase = BrokerPhase::Idle;
                }
                guard.turn_loop_running = false;
                return;
            }
            if phase != BrokerPhase::Paused {
                break;
            }
            // Register for the next notification *before* releasing the
            // lock: `resume()`/`stop_processing()`/`shutdown()` all
            // mutate `phase` and call `notify_waiters()` under the same
            // mutex, so creating `Notified` here (while still holding
            // the lock we just read `Paused` under) guarantees we can't
            // miss a wakeup that lands between the unlock and the await
            // below.
            let notified = notify.notified();
            drop(guard);
            notified.await;
        }

        let (snapshot, width, height) = {
            let state = state.lock().await;
            (state.world.clone(), state.world.width(), state.world.height())
        };

        let new_world = distribute_work(&snapshot, width, height, &workers).await;

        let mut state = state.lock().await;
        if state.phase.stop() {
            if state.phase != BrokerPhase::ShuttingDown {
                state.phase = BrokerPhase::Idle;
            }
            state.turn_loop_running = false;
            return;
        }
        state.world = new_world;
        state.turn = t + 1;
        debug!(turn = state.turn, "completed turn");
    }

    let mut state = state.lock().await;
    if state.phase != BrokerPhase::ShuttingDown {
        state.phase = BrokerPhase::Idle;
    }
    state.turn_loop_running = false;
    info!(turns = state.turn, "simulation completed");
}

/// Fan strips out to every worker in parallel and reassemble the next
/// world. A worker that errors leaves its rows zero-filled in the
/// result (a known partial-failure hazard, not silently patched over).
async fn distribute_work(
    world: &World,
    width: usize,
    height: usize,
    workers: &Arc<Vec<WorkerClient>>,
) -> World {
    let strips = plan_strips(height, workers.len());
    let mut rows = vec![vec![DEAD; width]; height];

    if workers.is_empty() {
        return World::from_rows(width, height, rows).expect("rows sized to width/height");
    }

    let mut tasks: JoinSet<(usize, Result<Vec<Vec<u8>>>)> = JoinSet::new();
    for (index, range) in strips.iter().enumerate() {
        if range.is_empty() {
            continue;
        }
        let workers = Arc::clone(workers);
        let padded = extract_strip_with_ghosts(world, *range);
        let request = WorkerRequest {
            start_y: range.start_y as u32,
            end_y: range.end_y as u32,
            world_slice: padded,
            image_width: width as u32,
            image_height: height as u32,
        };
        tasks.spawn(async move {
            let result = workers[index].calculate_next_state(request).await;
            (index, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(pair) => pair,
            Err(err) => {
                warn!(%err, "worker task panicked");
                continue;
            }
        };
        let range = strips[index];
        match result {
            Ok(evolved_rows) => {
                for (offset, row) in evolved_rows.into_iter().enumerate() {
                    rows[range.start_y + offset] = row;
                }
            }
            Err(err) => {
                warn!(worker_index = index, error = %err, "worker call failed, strip left zero-filled");
            }
        }
    }

    World::from_rows(width, height, rows).expect("rows sized to width/height")
}
