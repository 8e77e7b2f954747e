//! Server core functionality
//!
//! The supervisor, its two loops, the operator console, and configuration.

pub mod accept;
pub mod broadcast;
pub mod config;
pub mod core;
pub mod operator;

pub use self::config::ServerConfig;
pub use self::core::{RunningServer, Server, serve};
