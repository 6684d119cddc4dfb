//! Connection acceptance, shared server context, and backpressure
//!
//! The process-wide context is built once at startup and injected into
//! every engine task; there is no static state. Concurrency model:
//! task-per-connection under a fixed admission budget. When the budget is
//! exhausted, new connections get an immediate overload response instead
//! of queueing.

pub mod engine;
pub mod handle;
pub mod registry;

use crate::auth::AuthHandler;
use crate::command::{CommandContext, CommandRegistry, Dispatcher};
use crate::config::Config;
use crate::feed::PeerFeed;
use crate::gateway::MailingListGateway;
use crate::network;
use crate::protocol::responses;
use crate::storage::Storage;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub use handle::{ConnectionHandle, ResponseSender};
pub use registry::{spawn_reaper, ConnectionRegistry};

/// Process-wide context shared by every connection engine
pub struct ServerContext {
    pub command_ctx: CommandContext,
    pub dispatcher: Dispatcher,
    pub registry: Arc<ConnectionRegistry>,
    pub max_line_length: usize,
    pub greeting_line: String,
}

/// The NNTP server: owns the admission budget, registry, and reaper timing
pub struct NntpServer {
    context: Arc<ServerContext>,
    admission: Arc<Semaphore>,
    idle_timeout: Duration,
    reaper_interval: Duration,
}

impl NntpServer {
    /// Assemble a server from configuration and its collaborators
    pub fn new(
        config: &Config,
        storage: Arc<dyn Storage>,
        feed: Arc<dyn PeerFeed>,
        gateway: Arc<dyn MailingListGateway>,
    ) -> Result<Self> {
        let auth = Arc::new(AuthHandler::from_config(&config.auth)?);
        let registry = Arc::new(ConnectionRegistry::new());

        let ident = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
        let greeting_line = responses::greeting(&config.server.hostname, ident);

        let command_ctx = CommandContext {
            storage,
            feed,
            gateway,
            auth,
            hostname: config.server.hostname.clone(),
            max_article_size: config.limits.max_article_size,
        };

        let max_connections = config.limits.effective_max_connections();
        info!("admission budget: {} concurrent connections", max_connections);

        let context = Arc::new(ServerContext {
            command_ctx,
            dispatcher: Dispatcher::new(Arc::new(CommandRegistry::standard())),
            registry,
            max_line_length: config.limits.max_line_length,
            greeting_line,
        });

        Ok(Self {
            context,
            admission: Arc::new(Semaphore::new(max_connections)),
            idle_timeout: config.timeouts.idle,
            reaper_interval: config.timeouts.reaper_interval,
        })
    }

    /// Registry of live connections (observability and tests)
    #[must_use]
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.context.registry.clone()
    }

    /// Accept connections until the listener fails or the task is aborted
    ///
    /// Spawns the reaper on its own timer before entering the accept loop.
    pub async fn run(&self, listener: TcpListener) -> Result<()> {
        let reaper = spawn_reaper(
            self.context.registry.clone(),
            self.reaper_interval,
            self.idle_timeout,
        );

        let result = self.accept_loop(listener).await;
        reaper.abort();
        result
    }

    async fn accept_loop(&self, listener: TcpListener) -> Result<()> {
        info!("listening on {}", listener.local_addr()?);
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                    continue;
                }
            };

            if let Err(e) = network::tune_stream(&stream) {
                debug!("socket tuning failed for {}: {}", peer, e);
            }

            match self.admission.clone().try_acquire_owned() {
                Ok(permit) => {
                    let handle = self.context.registry.register(peer);
                    let context = self.context.clone();
                    info!("accepted {} as {}", peer, handle.id());
                    tokio::spawn(async move {
                        if let Err(e) = engine::run_connection(stream, handle, context).await {
                            warn!("connection from {} errored: {:#}", peer, e);
                        }
                        drop(permit);
                    });
                }
                Err(_) => {
                    // Budget exhausted: refuse now instead of queueing, so
                    // latency stays bounded under load
                    warn!("admission budget exhausted, refusing {}", peer);
                    tokio::spawn(reply_overloaded(stream, peer));
                }
            }
        }
    }

    /// Ask every live connection to close and let their engines drain
    pub async fn graceful_shutdown(&self) {
        info!(
            "closing {} live connection(s)",
            self.context.registry.len()
        );
        self.context.registry.close_all();
    }
}

async fn reply_overloaded(mut stream: TcpStream, peer: std::net::SocketAddr) {
    let mut line = responses::OVERLOADED.as_bytes().to_vec();
    line.extend_from_slice(b"\r\n");
    if let Err(e) = stream.write_all(&line).await {
        debug!("overload reply to {} failed: {}", peer, e);
    }
    let _ = stream.shutdown().await;
}
