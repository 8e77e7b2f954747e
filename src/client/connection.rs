//! Connection handles
//!
//! Defines the `Transport` seam used by the relay and the TCP-backed
//! `Connection` that the accept loop produces.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// Identifier assigned by the registry when a connection is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-blocking byte transport for one peer.
///
/// Both operations must return immediately. When nothing can be done right
/// now they fail with `ErrorKind::WouldBlock`.
pub trait Transport {
    /// Receives whatever is pending into `buf`. `Ok(0)` means the peer shut
    /// down its sending side.
    fn try_receive(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes as much of `payload` as the socket accepts right now.
    fn try_send(&self, payload: &[u8]) -> io::Result<usize>;

    fn peer_addr(&self) -> SocketAddr;
}

/// One accepted client socket.
///
/// Sockets registered with tokio are always in non-blocking mode, so
/// `try_receive` and `try_send` never suspend the caller.
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl Connection {
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self { stream, peer_addr }
    }
}

impl Transport for Connection {
    fn try_receive(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }

    fn try_send(&self, payload: &[u8]) -> io::Result<usize> {
        self.stream.try_write(payload)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer_addr", &self.peer_addr)
            .finish()
    }
}
