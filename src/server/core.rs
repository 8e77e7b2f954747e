use log::{debug, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::client::{ClientRegistry, SharedRegistry};
use crate::error::ServerError;
use crate::server::accept::run_accept_loop;
use crate::server::broadcast::run_broadcast_loop;
use crate::server::config::ServerConfig;
use crate::server::operator::{self, StopReason};

/// A bound server that has not started its loops yet.
pub struct Server {
    listener: TcpListener,
    registry: SharedRegistry,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listening socket. A failed bind leaves nothing open.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = config.socket_addr();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::from_bind(addr, e))?;

        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            listener,
            registry: ClientRegistry::shared(),
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Spawns the accept and broadcast loops over one shared registry.
    pub fn start(self) -> std::io::Result<RunningServer> {
        let local_addr = self.listener.local_addr()?;
        let config = self.config;

        let accept = tokio::spawn(run_accept_loop(
            self.listener,
            Arc::clone(&self.registry),
            config.accept_backoff(),
        ));
        let broadcast = tokio::spawn(run_broadcast_loop(
            Arc::clone(&self.registry),
            config.buffer_size,
            config.poll_interval(),
        ));

        Ok(RunningServer {
            local_addr,
            registry: self.registry,
            accept,
            broadcast,
        })
    }

    /// Runs the server until `shutdown` resolves, then stops it.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let running = self.start()?;
        shutdown.await;
        running.stop().await;
        Ok(())
    }
}

/// Handle to a server whose loops are running.
pub struct RunningServer {
    local_addr: SocketAddr,
    registry: SharedRegistry,
    accept: JoinHandle<()>,
    broadcast: JoinHandle<()>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn client_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    /// Aborts both loops. The listener and every registered connection are
    /// dropped with them.
    pub async fn stop(self) {
        self.accept.abort();
        self.broadcast.abort();
        let _ = self.accept.await;
        let _ = self.broadcast.await;

        let mut clients = self.registry.lock().await;
        let remaining = clients.len();
        debug!("Dropping clients {:?}", clients.peer_addrs());
        *clients = ClientRegistry::new();
        info!("Server stopped ({} clients dropped)", remaining);
    }
}

/// Process entry for server mode: bind, start, and wait for `quit` or Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    info!("Initializing the server...");

    let server = Server::bind(config).await?;
    let addr = server.local_addr()?;

    info!(
        "Server listening on {} press <Ctrl+C> or type '{}' to stop it",
        addr,
        operator::STOP_COMMAND
    );

    server.run_until(wait_for_operator()).await?;
    Ok(())
}

async fn wait_for_operator() {
    let console = async {
        let stdin = BufReader::new(tokio::io::stdin());
        if operator::wait_for_stop(stdin).await == StopReason::InputClosed {
            info!("Operator input closed, press <Ctrl+C> to stop the server");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = console => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Interrupt received");
        }
    }
}
