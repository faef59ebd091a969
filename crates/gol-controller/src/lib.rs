//! The controller's core interactive loop, factored out of the `main`
//! binary so it can be driven against fake collaborators in tests (a
//! fake broker, a `ChannelEventSink`, an in-memory `KeySource`) instead
//! of only ever running against the real terminal, broker, and PGM
//! files.

use std::time::Duration;

use gol_core::{ALIVE, Coord};
use gol_io::{ControllerEvent, ControllerState, EventSink, ImageSink, ImageSource, KeyPress, KeySource};
use gol_protocol::{BrokerRequest, BrokerResponse, read_message, write_message};
use tokio::net::TcpStream;
use tracing::warn;

/// World geometry and turn count for one controller run.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub width: u32,
    pub height: u32,
    pub turns: u32,
}

/// Why the main loop exited.
enum QuitReason {
    /// `q` was pressed — terminate without persisting the world.
    Stopped,
    /// `k` was pressed, or the simulation ran to completion.
    Finalize,
}

/// Load the named input image, drive `Process` on `stream`, then run
/// the interactive poll loop (keyboard / 2s tick / 10ms poll) to
/// completion, reporting every event to `sink`. Finalization (final
/// `GetWorld`, final PGM, `FinalTurnComplete`, `StateChange(Quitting)`)
/// runs after the loop exits, except when the user pressed `q` — per
/// the stop contract that case terminates immediately without
/// persisting the world.
pub async fn run<Src, Snk, Ev, Keys>(
    mut stream: TcpStream,
    input: &Src,
    output: &Snk,
    sink: &Ev,
    keys: &mut Keys,
    config: RunConfig,
) -> anyhow::Result<()>
where
    Src: ImageSource,
    Snk: ImageSink,
    Ev: EventSink,
    Keys: KeySource,
{
    let width = config.width as usize;
    let height = config.height as usize;

    let input_filename = format!("{}x{}", config.width, config.height);
    let bytes = input.read(&input_filename, width, height)?;

    let mut world_rows: Vec<Vec<u8>> = bytes.chunks_exact(width).map(<[u8]>::to_vec).collect();
    for (y, row) in world_rows.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            if cell == ALIVE {
                sink.emit(ControllerEvent::CellFlipped {
                    turn: 0,
                    cell: Coord::new(x as u32, y as u32),
                });
            }
        }
    }

    call_broker(
        &mut stream,
        BrokerRequest::Process {
            world: std::mem::take(&mut world_rows),
            width: config.width,
            height: config.height,
            turns: config.turns,
        },
    )
    .await?;

    sink.emit(ControllerEvent::StateChange {
        turn: 0,
        state: ControllerState::Executing,
    });

    let mut tick = tokio::time::interval(Duration::from_secs(2));
    let mut poll = tokio::time::interval(Duration::from_millis(10));

    let mut paused = false;
    let mut previous_turn: u32 = 0;
    let mut previous_world: Option<Vec<Vec<u8>>> = None;
    let quit_reason;

    loop {
        tokio::select! {
            key = keys.next_key() => {
                match key {
                    Ok(Some(KeyPress::Save)) => {
                        if let BrokerResponse::World { world, completed_turns, .. } =
                            call_broker(&mut stream, BrokerRequest::GetWorld).await?
                        {
                            if let Some(world) = world {
                                write_pgm(output, sink, config.width, config.height, completed_turns, &world)?;
                            }
                        }
                    }
                    Ok(Some(KeyPress::Pause)) => {
                        if !paused {
                            if let BrokerResponse::Pause { turn } =
                                call_broker(&mut stream, BrokerRequest::Pause).await?
                            {
                                paused = true;
                                sink.emit(ControllerEvent::StateChange { turn, state: ControllerState::Paused });
                            }
                        } else {
                            call_broker(&mut stream, BrokerRequest::Resume).await?;
                            paused = false;
                            if let BrokerResponse::World { completed_turns, .. } =
                                call_broker(&mut stream, BrokerRequest::GetWorld).await?
                            {
                                sink.emit(ControllerEvent::StateChange {
                                    turn: completed_turns,
                                    state: ControllerState::Executing,
                                });
                            }
                        }
                    }
                    Ok(Some(KeyPress::Quit)) => {
                        call_broker(&mut stream, BrokerRequest::StopProcessing).await?;
                        quit_reason = QuitReason::Stopped;
                        break;
                    }
                    Ok(Some(KeyPress::Kill)) => {
                        call_broker(&mut stream, BrokerRequest::Shutdown).await?;
                        quit_reason = QuitReason::Finalize;
                        break;
                    }
                    Ok(Some(KeyPress::Other(_))) | Ok(None) => {}
                    Err(err) => warn!(%err, "key source error"),
                }
            }

            _ = tick.tick() => {
                if let BrokerResponse::AliveCells { cells_count, completed_turns } =
                    call_broker(&mut stream, BrokerRequest::GetAliveCells).await?
                {
                    if completed_turns > 0 {
                        sink.emit(ControllerEvent::AliveCellsCount {
                            turn: completed_turns,
                            count: cells_count,
                        });
                    }
                }
            }

            _ = poll.tick() => {
                if let BrokerResponse::World { world, completed_turns, processing } =
                    call_broker(&mut stream, BrokerRequest::GetWorld).await?
                {
                    if completed_turns > previous_turn {
                        if let (Some(previous), Some(current)) = (&previous_world, &world) {
                            if completed_turns > 1 {
                                let flipped = diff_cells(previous, current);
                                if !flipped.is_empty() {
                                    sink.emit(ControllerEvent::CellsFlipped {
                                        turn: completed_turns,
                                        cells: flipped,
                                    });
                                }
                            }
                        }
                        sink.emit(ControllerEvent::TurnComplete { turn: completed_turns });
                        if world.is_some() {
                            previous_world = world;
                        }
                        previous_turn = completed_turns;
                    }

                    if !processing {
                        quit_reason = QuitReason::Finalize;
                        break;
                    }
                }
            }
        }
    }

    if let QuitReason::Finalize = quit_reason {
        if let BrokerResponse::World { world, completed_turns, .. } =
            call_broker(&mut stream, BrokerRequest::GetWorld).await?
        {
            if let Some(world) = world {
                write_pgm(output, sink, config.width, config.height, completed_turns, &world)?;
                let alive_cells = alive_coords(&world);
                sink.emit(ControllerEvent::FinalTurnComplete {
                    turn: completed_turns,
                    alive_cells,
                });
                sink.emit(ControllerEvent::StateChange {
                    turn: completed_turns,
                    state: ControllerState::Quitting,
                });
            }
        }
    }

    sink.close();
    Ok(())
}

async fn call_broker(
    stream: &mut TcpStream,
    request: BrokerRequest,
) -> anyhow::Result<BrokerResponse> {
    write_message(stream, &request).await?;
    let response = read_message(stream).await?;
    Ok(response)
}

fn write_pgm(
    output: &impl ImageSink,
    sink: &impl EventSink,
    width: u32,
    height: u32,
    turn: u32,
    world: &[Vec<u8>],
) -> anyhow::Result<()> {
    let flat: Vec<u8> = world.iter().flatten().copied().collect();
    let filename = format!("{width}x{height}x{turn}");
    output.write(&filename, width as usize, height as usize, &flat)?;
    sink.emit(ControllerEvent::ImageOutputComplete { turn, filename });
    Ok(())
}

fn diff_cells(previous: &[Vec<u8>], current: &[Vec<u8>]) -> Vec<Coord> {
    let mut flipped = Vec::new();
    for (y, (prev_row, cur_row)) in previous.iter().zip(current.iter()).enumerate() {
        for (x, (&prev, &cur)) in prev_row.iter().zip(cur_row.iter()).enumerate() {
            if prev != cur {
                flipped.push(Coord::new(x as u32, y as u32));
            }
        }
    }
    flipped
}

fn alive_coords(world: &[Vec<u8>]) -> Vec<Coord> {
    let mut cells = Vec::new();
    for (y, row) in world.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            if cell == ALIVE {
                cells.push(Coord::new(x as u32, y as u32));
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use gol_core::DEAD;

    #[test]
    fn diff_cells_finds_only_changed_coordinates() {
        let previous = vec![vec![DEAD, ALIVE], vec![DEAD, DEAD]];
        let current = vec![vec![ALIVE, ALIVE], vec![DEAD, ALIVE]];
        let mut flipped = diff_cells(&previous, &current);
        flipped.sort_by_key(|c| (c.y, c.x));
        assert_eq!(flipped, vec![Coord::new(0, 0), Coord::new(1, 1)]);
    }

    #[test]
    fn diff_cells_is_empty_for_identical_worlds() {
        let world = vec![vec![ALIVE, DEAD], vec![DEAD, ALIVE]];
        assert!(diff_cells(&world, &world).is_empty());
    }

    #[test]
    fn alive_coords_lists_every_alive_cell() {
        let world = vec![vec![ALIVE, DEAD], vec![DEAD, ALIVE]];
        let mut cells = alive_coords(&world);
        cells.sort_by_key(|c| (c.y, c.x));
        assert_eq!(cells, vec![Coord::new(0, 0), Coord::new(1, 1)]);
    }
}
