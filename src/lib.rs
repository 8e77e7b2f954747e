pub mod chat;
pub mod cli;
pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod utils;

pub use server::Server;
