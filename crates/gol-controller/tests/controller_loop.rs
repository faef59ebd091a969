//! Drives `gol_controller::run` end to end against an in-process fake
//! broker (itself backed by an in-process fake worker) and asserts on
//! the exact `ControllerEvent` sequence spec.md §6 describes, using
//! `ChannelEventSink` — this is the test that sink exists for.

use std::time::Duration;

use gol_broker::Broker;
use gol_controller::RunConfig;
use gol_core::{ALIVE, Coord, World, evolve_strip};
use gol_io::{
    ChannelEventSink, ControllerEvent, ControllerState, FilePgm, ImageSink, KeyPress, KeySource,
};
use gol_protocol::{BrokerRequest, WorkerRequest, WorkerResponse, read_message, write_message};
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};

/// A minimal worker: accepts connections forever, evolving each strip
/// handed to it. Same shape as `gol-broker`'s own fake-worker fixture.
async fn spawn_fake_worker() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                loop {
                    let request: WorkerRequest = match read_message(&mut socket).await {
                        Ok(request) => request,
                        Err(_) => return,
                    };
                    let response =
                        match evolve_strip(&request.world_slice, request.image_width as usize) {
                            Ok(world_slice) => WorkerResponse::Ok { world_slice },
                            Err(err) => WorkerResponse::MalformedStrip {
                                message: err.to_string(),
                            },
                        };
                    if write_message(&mut socket, &response).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    addr
}

/// A fake broker: a real `gol_broker::Broker` behind a TCP listener that
/// dispatches `Broker.*` requests, the same accept-loop shape as the
/// `gol-broker` binary.
async fn spawn_fake_broker(worker_addrs: &[String]) -> String {
    let broker = Broker::connect(worker_addrs).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let broker = broker.clone();
            tokio::spawn(async move {
                loop {
                    let request: BrokerRequest = match read_message(&mut socket).await {
                        Ok(request) => request,
                        Err(_) => return,
                    };
                    let response = broker.handle(request).await;
                    if write_message(&mut socket, &response).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    addr
}

/// A key source that never produces a key — the `select!` branch that
/// reads it simply never fires, so the run completes purely from the
/// tick/poll branches, like a controller with nobody at the keyboard.
struct NeverKeySource;

impl KeySource for NeverKeySource {
    async fn next_key(&mut self) -> gol_io::Result<Option<KeyPress>> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn run_reports_the_expected_event_sequence_to_a_channel_sink() {
    let worker_addr = spawn_fake_worker().await;
    let broker_addr = spawn_fake_broker(&[worker_addr]).await;

    let temp = TempDir::new().unwrap();
    let input = FilePgm::new(temp.path());
    let output = FilePgm::new(temp.path());

    // A 3-cell vertical blinker on a 5x5 board.
    let mut world = World::new_dead(5, 5);
    for y in 0..3 {
        world.set(Coord::new(1, y), ALIVE);
    }
    input
        .write("5x5", 5, 5, &world.to_flat_bytes())
        .unwrap();

    let (sink, mut events) = ChannelEventSink::new();
    let mut keys = NeverKeySource;

    let stream = TcpStream::connect(&broker_addr).await.unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        gol_controller::run(
            stream,
            &input,
            &output,
            &sink,
            &mut keys,
            RunConfig { width: 5, height: 5, turns: 2 },
        ),
    )
    .await
    .expect("controller run timed out")
    .expect("controller run failed");
    drop(sink);

    let mut received = Vec::new();
    while let Some(event) = events.recv().await {
        received.push(event);
    }

    // Three initially-alive cells, reported before anything else.
    let initial_flips = received
        .iter()
        .take_while(|e| matches!(e, ControllerEvent::CellFlipped { .. }))
        .count();
    assert_eq!(initial_flips, 3);

    assert!(matches!(
        received[3],
        ControllerEvent::StateChange { turn: 0, state: ControllerState::Executing }
    ));

    let turn_completes: Vec<u32> = received
        .iter()
        .filter_map(|e| match e {
            ControllerEvent::TurnComplete { turn } => Some(*turn),
            _ => None,
        })
        .collect();
    assert!(
        turn_completes.windows(2).all(|w| w[0] < w[1]),
        "turn numbers must strictly increase: {turn_completes:?}"
    );
    assert_eq!(turn_completes.last(), Some(&2));

    // No diff is emitted for the turn-0 -> turn-1 transition (no cached
    // previous world yet); turn 1 -> 2 may emit one if anything flipped.
    assert!(
        received
            .iter()
            .filter_map(|e| match e {
                ControllerEvent::CellsFlipped { turn, .. } => Some(*turn),
                _ => None,
            })
            .all(|turn| turn > 1)
    );

    let final_turn_complete = received.iter().find_map(|e| match e {
        ControllerEvent::FinalTurnComplete { turn, alive_cells } => Some((*turn, alive_cells.len())),
        _ => None,
    });
    assert_eq!(final_turn_complete, Some((2, 3)));

    assert!(matches!(
        received.last(),
        Some(ControllerEvent::StateChange { turn: 2, state: ControllerState::Quitting })
    ));
}
