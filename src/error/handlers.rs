//! Error handlers
//!
//! Reports fatal errors and maps them to process exit codes.

use crate::error::types::{AppError, ClientError, ServerError};
use log::error;

/// Log a fatal error
pub fn report(err: &AppError) {
    match err {
        AppError::Server(ServerError::PermissionDenied(addr, _)) => {
            error!("Cannot use a port below 1024 without elevated privileges ({})", addr);
        }
        AppError::Server(ServerError::AddressUnavailable(addr, _)) => {
            error!(
                "Cannot assign the IP address, or the port is already in use. \
                 Make sure to use a valid IP on your network and a free port ({})",
                addr
            );
        }
        AppError::Client(ClientError::ConnectionRefused(addr)) => {
            error!("Connection refused by {}", addr);
        }
        AppError::Client(ClientError::ServerGone(_)) => {
            error!("The server has stopped");
        }
        other => error!("{}", other),
    }
}

/// Convert error to process exit code
pub fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::Server(_) => 1,
        AppError::Client(_) => 1,
    }
}
