//! Client connection management
//!
//! Holds accepted connections and the registry the relay iterates over.

pub mod connection;
pub mod registry;

pub use connection::{Connection, ConnectionId, Transport};
pub use registry::{ClientRegistry, SharedRegistry};
