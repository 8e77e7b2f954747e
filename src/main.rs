//! relay-chat - Entry Point
//!
//! A multi-client text broadcast server and its terminal client.

use log::info;
use std::net::SocketAddr;

use relay_chat::chat;
use relay_chat::cli::{self, Invocation, Mode};
use relay_chat::error::handlers::{exit_code, report};
use relay_chat::error::{AppError, ServerError};
use relay_chat::server::{self, ServerConfig};
use relay_chat::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    let mode = match cli::parse_args(std::env::args_os()) {
        Invocation::Run(mode) => mode,
        Invocation::Usage(text) => {
            println!("{}", text);
            std::process::exit(0);
        }
    };

    setup_logging();

    let code = match run(mode).await {
        Ok(()) => 0,
        Err(e) => {
            report(&e);
            exit_code(&e)
        }
    };

    // Stdin is read on a blocking thread that would hold up runtime shutdown.
    std::process::exit(code);
}

async fn run(mode: Mode) -> Result<(), AppError> {
    match mode {
        Mode::Serve(listen) => {
            let config = ServerConfig::load(listen).map_err(ServerError::from)?;
            info!("Launching chat server...");
            server::serve(config).await?;
        }
        Mode::Connect { server, username } => {
            chat::run(SocketAddr::V4(server), &username).await?;
        }
    }
    Ok(())
}
