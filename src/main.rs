use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use nntpd::feed::ChannelFeed;
use nntpd::gateway::NoopGateway;
use nntpd::storage::MemoryStorage;
use nntpd::{load_or_create, NntpServer};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, default_value = "nntpd.toml")]
    config: String,

    /// Number of worker threads (defaults to the config file, then CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Newsgroups to create at startup
    #[arg(short = 'g', long = "group", value_name = "NAME")]
    groups: Vec<String>,
}

fn main() -> Result<()> {
    nntpd::logging::init_dual_logging();

    let args = Args::parse();

    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    let worker_threads = args.threads.unwrap_or(num_cpus);

    // A single worker avoids cross-thread wakeups entirely; otherwise use
    // the multi-threaded runtime sized to the requested parallelism
    if worker_threads == 1 {
        info!("starting with single-threaded runtime");
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(run_server(args))
    } else {
        info!(
            "starting with {} worker threads (detected {} CPUs)",
            worker_threads, num_cpus
        );
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .enable_all()
            .build()?;
        rt.block_on(run_server(args))
    }
}

async fn run_server(args: Args) -> Result<()> {
    let mut config = load_or_create(&args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let storage = Arc::new(MemoryStorage::new());
    for group in &args.groups {
        storage.create_group(group);
        info!("created group {}", group);
    }

    // Replication drain: peers are outside the core, so accepted articles
    // are only logged here before being dropped
    let (feed, mut feed_rx) = ChannelFeed::new();
    tokio::spawn(async move {
        while let Some(article) = feed_rx.recv().await {
            info!("queued {} for outbound replication", article.message_id);
        }
    });

    let server = Arc::new(NntpServer::new(
        &config,
        storage,
        Arc::new(feed),
        Arc::new(NoopGateway),
    )?);

    let listen_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&listen_addr).await?;

    let server_for_shutdown = server.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received, closing connections...");
        server_for_shutdown.graceful_shutdown().await;
        info!("graceful shutdown complete");
        std::process::exit(0);
    });

    if let Err(e) = server.run(listener).await {
        warn!("server loop ended: {:#}", e);
        return Err(e);
    }
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
