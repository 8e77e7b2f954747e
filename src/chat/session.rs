//! Interactive chat session
//!
//! Connects to a server, prints what other users send, and sends what the
//! local user types.

use crossterm::style::Stylize;
use log::{info, warn};
use std::io::{ErrorKind, Write};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::select;

use crate::chat::input::{InputAction, classify};
use crate::error::ClientError;
use crate::protocol::payload;

const RECEIVE_BUFFER_SIZE: usize = 4096;

/// Runs the session until the user quits or the server goes away.
pub async fn run(server: SocketAddr, username: &str) -> Result<(), ClientError> {
    let stream = TcpStream::connect(server).await.map_err(|e| match e.kind() {
        ErrorKind::ConnectionRefused => ClientError::ConnectionRefused(server),
        _ => ClientError::IoError(e),
    })?;

    info!("[*] Connected to server {}", server);

    let (mut reader, mut writer) = stream.into_split();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut buf = vec![0u8; RECEIVE_BUFFER_SIZE];

    loop {
        prompt(username);

        select! {
            received = reader.read(&mut buf) => {
                handle_received(received, &buf)?;
            }
            line = stdin.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !handle_input(&line, username, &mut writer).await? {
                    break;
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
                break;
            }
        }
    }

    shutdown(&mut writer).await;
    drop(reader);
    info!("Connection closed");
    Ok(())
}

fn prompt(username: &str) {
    print!("{}", prompt_text(username));
    let _ = std::io::stdout().flush();
}

fn prompt_text(username: &str) -> String {
    format!("{}: Type a msg ->: ", username).green().to_string()
}

fn handle_received(received: std::io::Result<usize>, buf: &[u8]) -> Result<(), ClientError> {
    let n = match received {
        Ok(0) => return Err(ClientError::ServerGone(None)),
        Ok(n) => n,
        Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(()),
        Err(e) => return Err(ClientError::ServerGone(Some(e))),
    };

    match payload::decode(&buf[..n]) {
        Ok(message) => {
            info!("Sent by `{}`", message.sender);
            println!("\n{} {}", "Message:".cyan(), message.text);
        }
        Err(e) => warn!("Discarding message: {}", e),
    }
    Ok(())
}

/// Returns `false` once the user asked to leave.
async fn handle_input(
    line: &str,
    username: &str,
    writer: &mut OwnedWriteHalf,
) -> Result<bool, ClientError> {
    match classify(line) {
        InputAction::Skip => Ok(true),
        InputAction::Quit => Ok(false),
        InputAction::Send(text) => {
            let encoded = payload::encode(username, text);
            writer
                .write_all(&encoded)
                .await
                .map_err(|e| ClientError::ServerGone(Some(e)))?;
            Ok(true)
        }
    }
}

async fn shutdown(writer: &mut OwnedWriteHalf) {
    if let Err(e) = writer.shutdown().await {
        warn!("Failed to close connection cleanly: {}", e);
    }
}
