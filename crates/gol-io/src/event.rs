//! UI event sink — the controller's one-way notification channel.

use gol_core::Coord;
use tracing::info;

/// The controller's externally-visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Executing,
    Paused,
    Quitting,
}

/// Every event the controller may emit, in the order a run produces
/// them. Payloads carry whatever the controller already had in hand at
/// the point of emission — no extra round trip is implied.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    CellFlipped { turn: u32, cell: Coord },
    CellsFlipped { turn: u32, cells: Vec<Coord> },
    TurnComplete { turn: u32 },
    StateChange { turn: u32, state: ControllerState },
    AliveCellsCount { turn: u32, count: u32 },
    ImageOutputComplete { turn: u32, filename: String },
    FinalTurnComplete { turn: u32, alive_cells: Vec<Coord> },
}

/// A sink the controller reports [`ControllerEvent`]s to. Implementations
/// never fail the controller's main loop — sinks absorb or log their own
/// errors rather than propagating them back into the simulation loop.
pub trait EventSink {
    fn emit(&self, event: ControllerEvent);

    /// Called once, after the final event, before the controller exits.
    fn close(&self) {}
}

/// Reports every event as a structured `tracing` event at `INFO`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: ControllerEvent) {
        match event {
            ControllerEvent::CellFlipped { turn, cell } => {
                info!(turn, x = cell.x, y = cell.y, "cell flipped");
            }
            ControllerEvent::CellsFlipped { turn, cells } => {
                info!(turn, count = cells.len(), "cells flipped");
            }
            ControllerEvent::TurnComplete { turn } => {
                info!(turn, "turn complete");
            }
            ControllerEvent::StateChange { turn, state } => {
                info!(turn, ?state, "state change");
            }
            ControllerEvent::AliveCellsCount { turn, count } => {
                info!(turn, count, "alive cells count");
            }
            ControllerEvent::ImageOutputComplete { turn, filename } => {
                info!(turn, filename, "image output complete");
            }
            ControllerEvent::FinalTurnComplete { turn, alive_cells } => {
                info!(turn, count = alive_cells.len(), "final turn complete");
            }
        }
    }

    fn close(&self) {
        info!("event sink closed");
    }
}

/// Forwards every event down an unbounded channel, for tests that want
/// to assert on the exact event sequence a run produced.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: tokio::sync::mpsc::UnboundedSender<ControllerEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<ControllerEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: ControllerEvent) {
        // The receiver may already be dropped in a test that only cares
        // about a prefix of the event stream; that is not our problem.
        let _ = self.sender.send(event);
    }
}
