//! Turn-loop state machine scenarios: a straight run to completion,
//! pause/resume, interruption of an in-flight run by a new `Process`,
//! and shutdown mid-run. Each uses a pair of small in-process fake
//! workers rather than the real `gol-worker` binary.

use std::time::Duration;

use gol_broker::Broker;
use gol_core::{World, evolve_strip};
use gol_protocol::{WorkerRequest, WorkerResponse, read_message, write_message};
use tokio::net::TcpListener;

/// Spawn a minimal worker: accepts connections forever, evolves each
/// strip it's handed, one request at a time per connection.
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
                    // A touch of simulated latency so tests racing a
                    // control RPC against an in-flight turn have a
                    // realistic window to land mid-turn.
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    let response = match evolve_strip(&request.world_slice, request.image_width as usize) {
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

fn blinker(width: usize, height: usize) -> Vec<Vec<u8>> {
    let mut world = World::new_dead(width, height);
    for y in 0..3 {
        world.set(gol_core::Coord::new(1, y as u32), gol_core::ALIVE);
    }
    world.rows().to_vec()
}

async fn wait_for_idle(broker: &Broker) -> (u32, usize) {
    for _ in 0..200 {
        if let gol_protocol::BrokerResponse::World {
            world,
            completed_turns,
            processing,
        } = broker.get_world().await
        {
            if !processing {
                let alive = world
                    .map(|rows| rows.iter().flatten().filter(|&&b| b == gol_core::ALIVE).count())
                    .unwrap_or(0);
                return (completed_turns, alive);
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("broker never became idle");
}

#[tokio::test]
async fn process_runs_to_completion_and_matches_golden_evolution() {
    let w1 = spawn_fake_worker().await;
    let w2 = spawn_fake_worker().await;
    let broker = Broker::connect(&[w1, w2]).await.unwrap();

    let world = blinker(5, 5);
    broker.process(world.clone(), 5, 5, 3).await;

    let (turn, alive) = wait_for_idle(&broker).await;
    assert_eq!(turn, 3);

    let golden = World::from_rows(5, 5, world).unwrap().evolve_n(3);
    assert_eq!(alive, golden.alive_count());
}

#[tokio::test]
async fn zero_turns_completes_immediately_with_processing_false() {
    let w1 = spawn_fake_worker().await;
    let broker = Broker::connect(&[w1]).await.unwrap();

    broker.process(blinker(5, 5), 5, 5, 0).await;

    let response = broker.get_world().await;
    match response {
        gol_protocol::BrokerResponse::World { processing, completed_turns, .. } => {
            assert!(!processing);
            assert_eq!(completed_turns, 0);
        }
        _ => panic!("expected World response"),
    }
}

#[tokio::test]
async fn get_world_is_none_before_any_process_call() {
    let w1 = spawn_fake_worker().await;
    let broker = Broker::connect(&[w1]).await.unwrap();

    match broker.get_world().await {
        gol_protocol::BrokerResponse::World { world, .. } => assert!(world.is_none()),
        _ => panic!("expected World response"),
    }
}

#[tokio::test]
async fn pause_then_resume_completes_at_the_same_final_state() {
    let w1 = spawn_fake_worker().await;
    let w2 = spawn_fake_worker().await;
    let broker = Broker::connect(&[w1, w2]).await.unwrap();

    let world = blinker(6, 6);
    broker.process(world.clone(), 6, 6, 10).await;

    let pause_response = broker.pause().await;
    assert!(matches!(pause_response, gol_protocol::BrokerResponse::Pause { .. }));

    // Paused simulations report `processing = true` throughout.
    tokio::time::sleep(Duration::from_millis(20)).await;
    if let gol_protocol::BrokerResponse::World { processing, .. } = broker.get_world().await {
        assert!(processing);
    }

    broker.resume().await;
    let (turn, alive) = wait_for_idle(&broker).await;
    assert_eq!(turn, 10);

    let golden = World::from_rows(6, 6, world).unwrap().evolve_n(10);
    assert_eq!(alive, golden.alive_count());
}

#[tokio::test]
async fn a_new_process_call_interrupts_an_in_flight_run() {
    let w1 = spawn_fake_worker().await;
    let broker = Broker::connect(&[w1]).await.unwrap();

    // A long-running first simulation.
    broker.process(blinker(8, 8), 8, 8, 10_000).await;

    // Immediately supersede it with a short one; `process` internally
    // waits for the first turn loop to notice the stop and drain.
    let second_world = blinker(4, 4);
    broker.process(second_world.clone(), 4, 4, 2).await;

    let (turn, alive) = wait_for_idle(&broker).await;
    assert_eq!(turn, 2);

    let golden = World::from_rows(4, 4, second_world).unwrap().evolve_n(2);
    assert_eq!(alive, golden.alive_count());
}

#[tokio::test]
async fn stop_processing_reports_not_processing_immediately() {
    let w1 = spawn_fake_worker().await;
    let broker = Broker::connect(&[w1]).await.unwrap();

    // A long-running simulation, so the background turn-loop task is
    // still alive (likely mid-fanout) when `stop_processing` returns.
    broker.process(blinker(8, 8), 8, 8, 10_000).await;
    broker.stop_processing().await;

    // No polling loop here: `StopProcessing`'s contract is synchronous
    // ("sets stop and processing=false"), so the very next `GetWorld`
    // must already report `processing: false`, even though the turn
    // loop itself may still be draining its last fan-out in the
    // background.
    match broker.get_world().await {
        gol_protocol::BrokerResponse::World { processing, .. } => assert!(!processing),
        _ => panic!("expected World response"),
    }
}

#[tokio::test]
async fn shutdown_stops_the_turn_loop() {
    let w1 = spawn_fake_worker().await;
    let broker = Broker::connect(&[w1]).await.unwrap();

    broker.process(blinker(8, 8), 8, 8, 10_000).await;
    broker.shutdown().await;

    for _ in 0..200 {
        if let gol_protocol::BrokerResponse::World { processing, .. } = broker.get_world().await {
            if !processing {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("broker never stopped processing after shutdown");
}
