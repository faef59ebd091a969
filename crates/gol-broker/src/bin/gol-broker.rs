//! `gol-broker` — stateful turn-loop coordinator.
//!
//! Dials every configured worker at startup (a failed dial is fatal —
//! there is no degraded mode for a missing worker), then listens for
//! controller connections and dispatches `Broker.*` RPCs.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use gol_broker::Broker;
use gol_protocol::{BrokerRequest, read_message, write_message};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gol-broker", about = "Turn-loop coordinator for distributed Game of Life")]
struct Args {
    /// Address to bind the broker's RPC listener to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on.
    #[arg(long, default_value_t = gol_protocol::DEFAULT_BROKER_PORT)]
    port: u16,

    /// Worker address (`host:port`). Repeat once per worker; order
    /// determines strip assignment.
    #[arg(long = "worker", required = true)]
    workers: Vec<String>,

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

    let broker = Broker::connect(&args.workers)
        .await
        .context("failed to connect to all configured workers")?;
    info!(workers = args.workers.len(), "connected to all workers");

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.bind, args.port))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind broker listener on {addr}"))?;
    info!(%addr, "broker listening");

    loop {
        let (socket, peer) = listener.accept().await.context("accept failed")?;
        let broker = broker.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(socket, broker).await {
                warn!(%peer, error = %err, "broker connection ended with error");
            }
        });
    }
}

async fn handle_connection(mut socket: TcpStream, broker: Broker) -> gol_protocol::Result<()> {
    loop {
        let request: BrokerRequest = match read_message(&mut socket).await {
            Ok(request) => request,
            Err(gol_protocol::Error::Io(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let response = broker.handle(request).await;
        write_message(&mut socket, &response).await?;
    }
}
