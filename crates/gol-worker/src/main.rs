//! `gol-worker` — stateless strip-evolution server.
//!
//! Accepts TCP connections from a broker, reads one `WorkerRequest`,
//! evolves the strip by one turn, and writes back one `WorkerResponse`.
//! A worker holds no simulation state across calls, but the evolution
//! step itself is guarded by one `tokio::sync::Mutex` shared by every
//! connection task on this instance — a worker is not re-entrant, so
//! concurrent callers are serialized through the mutex rather than
//! relying on one connection per caller.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gol_core::evolve_strip;
use gol_protocol::{WorkerRequest, WorkerResponse, read_message, write_message};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gol-worker", about = "Strip-evolution worker for distributed Game of Life")]
struct Args {
    /// Address to bind the worker's RPC listener to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on.
    #[arg(long, default_value_t = gol_protocol::DEFAULT_WORKER_PORT)]
    port: u16,

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

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.bind, args.port))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind worker listener on {addr}"))?;
    info!(%addr, "worker listening");

    let evolution_lock = Arc::new(Mutex::new(()));

    loop {
        let (socket, peer) = listener.accept().await.context("accept failed")?;
        let evolution_lock = evolution_lock.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(socket, evolution_lock).await {
                warn!(%peer, error = %err, "worker connection ended with error");
            }
        });
    }
}

async fn handle_connection(
    mut socket: TcpStream,
    evolution_lock: Arc<Mutex<()>>,
) -> gol_protocol::Result<()> {
    loop {
        let request: WorkerRequest = match read_message(&mut socket).await {
            Ok(request) => request,
            Err(gol_protocol::Error::Io(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        debug!(
            start_y = request.start_y,
            end_y = request.end_y,
            "calculating next state"
        );

        let response = {
            // Serializes this instance's evolution step against every other
            // connection's calls — a worker is not re-entrant.
            let _guard = evolution_lock.lock().await;
            match evolve_strip(&request.world_slice, request.image_width as usize) {
                Ok(world_slice) => WorkerResponse::Ok { world_slice },
                Err(err) => {
                    error!(error = %err, "strip evolution failed");
                    WorkerResponse::MalformedStrip {
                        message: err.to_string(),
                    }
                }
            }
        };

        write_message(&mut socket, &response).await?;
    }
}
