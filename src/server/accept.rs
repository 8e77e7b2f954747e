//! Accept loop
//!
//! Registers every inbound connection on the listening socket.

use log::{error, info};
use std::io::{self, ErrorKind};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::client::{Connection, SharedRegistry};

/// Accepts connections for the lifetime of the task.
///
/// The listener is non-blocking; "nothing pending" never surfaces here as an
/// error. Other failures are logged and retried after `backoff`.
pub async fn run_accept_loop(listener: TcpListener, registry: SharedRegistry, backoff: Duration) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New client connected {}", addr);
                let conn = Connection::new(stream, addr);

                let mut clients = registry.lock().await;
                let id = clients.register(conn);
                info!("Registered {} as {} ({} clients)", addr, id, clients.len());
            }
            Err(ref e) if is_transient(e) => {
                tokio::task::yield_now().await;
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::WouldBlock
            | ErrorKind::Interrupted
            | ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
    )
}
