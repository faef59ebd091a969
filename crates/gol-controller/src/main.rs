//! `gol-controller` — loads an initial image, drives the broker through
//! one simulation, and reports progress to the UI event sink while
//! handling keyboard control.
//!
//! The interactive loop itself lives in the `gol-controller` library
//! crate (`lib.rs`), parameterized over the collaborator traits, so it
//! can be exercised against fake workers/broker/sink in tests; this
//! binary just wires up the real terminal, broker connection, and PGM
//! files and calls it.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use gol_controller::RunConfig;
use gol_io::{CrosstermKeySource, FilePgm, TracingEventSink};
use tokio::net::TcpStream;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gol-controller", about = "Driving client for distributed Game of Life")]
struct Args {
    /// Broker address (`host:port`).
    #[arg(long)]
    broker: String,

    /// World width.
    #[arg(long)]
    width: u32,

    /// World height.
    #[arg(long)]
    height: u32,

    /// Number of turns to simulate.
    #[arg(long)]
    turns: u32,

    /// Directory holding the input PGM, named `{width}x{height}`.
    #[arg(long, default_value = ".")]
    input_dir: String,

    /// Directory to write output PGMs into.
    #[arg(long, default_value = ".")]
    output_dir: String,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let input = FilePgm::new(&args.input_dir);
    let output = FilePgm::new(&args.output_dir);
    let sink = TracingEventSink;

    let broker_addr: SocketAddr = args
        .broker
        .parse()
        .with_context(|| format!("invalid broker address {}", args.broker))?;
    let stream = TcpStream::connect(broker_addr)
        .await
        .with_context(|| format!("failed to connect to broker at {broker_addr}"))?;
    info!(%broker_addr, "connected to broker");

    let mut keys = CrosstermKeySource::new();

    gol_controller::run(
        stream,
        &input,
        &output,
        &sink,
        &mut keys,
        RunConfig {
            width: args.width,
            height: args.height,
            turns: args.turns,
        },
    )
    .await
}
