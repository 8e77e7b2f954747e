//! Error types
//!
//! Defines the error types for server startup, client mode, and chat payloads.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::string::FromUtf8Error;

/// Server startup errors
#[derive(Debug)]
pub enum ServerError {
    /// Binding needs privileges the process lacks (ports below 1024).
    PermissionDenied(SocketAddr, io::Error),
    /// Invalid address, address in use, or address not available.
    AddressUnavailable(SocketAddr, io::Error),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::PermissionDenied(addr, e) => write!(
                f,
                "Cannot use a port below 1024 without elevated privileges ({}: {})",
                addr, e
            ),
            ServerError::AddressUnavailable(addr, e) => write!(
                f,
                "Cannot assign the IP address, or the port is already in use. \
                 Make sure to use a valid IP on your network and a free port ({}: {})",
                addr, e
            ),
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl ServerError {
    /// Classifies a failed bind on `addr`.
    pub fn from_bind(addr: SocketAddr, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => ServerError::PermissionDenied(addr, error),
            _ => ServerError::AddressUnavailable(addr, error),
        }
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}

/// Client mode errors
#[derive(Debug)]
pub enum ClientError {
    ConnectionRefused(SocketAddr),
    /// The server closed or reset the connection.
    ServerGone(Option<io::Error>),
    IoError(io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::ConnectionRefused(addr) => write!(f, "Connection refused by {}", addr),
            ClientError::ServerGone(None) => write!(f, "The server has stopped"),
            ClientError::ServerGone(Some(e)) => write!(f, "The server has stopped: {}", e),
            ClientError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<io::Error> for ClientError {
    fn from(error: io::Error) -> Self {
        ClientError::IoError(error)
    }
}

/// Chat payload decoding errors
#[derive(Debug)]
pub enum PayloadError {
    Encoding(base64::DecodeError),
    Utf8(FromUtf8Error),
    MissingSeparator,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::Encoding(e) => write!(f, "Invalid payload encoding: {}", e),
            PayloadError::Utf8(e) => write!(f, "Payload is not valid UTF-8: {}", e),
            PayloadError::MissingSeparator => write!(f, "Payload has no sender separator"),
        }
    }
}

impl std::error::Error for PayloadError {}

impl From<base64::DecodeError> for PayloadError {
    fn from(error: base64::DecodeError) -> Self {
        PayloadError::Encoding(error)
    }
}

impl From<FromUtf8Error> for PayloadError {
    fn from(error: FromUtf8Error) -> Self {
        PayloadError::Utf8(error)
    }
}

/// Top-level error that ends the process
#[derive(Debug)]
pub enum AppError {
    Server(ServerError),
    Client(ClientError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Server(e) => write!(f, "Server error: {}", e),
            AppError::Client(e) => write!(f, "Client error: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ServerError> for AppError {
    fn from(error: ServerError) -> Self {
        AppError::Server(error)
    }
}

impl From<ClientError> for AppError {
    fn from(error: ClientError) -> Self {
        AppError::Client(error)
    }
}
