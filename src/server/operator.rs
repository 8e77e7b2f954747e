//! Operator console
//!
//! Reads commands typed into the server's terminal. The only command that does
//! anything is `quit`, which stops the server.

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const STOP_COMMAND: &str = "quit";

#[derive(Debug, PartialEq)]
pub enum OperatorCommand {
    Stop,
    Empty,
    Unknown(String),
}

impl OperatorCommand {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            OperatorCommand::Empty
        } else if trimmed.eq_ignore_ascii_case(STOP_COMMAND) {
            OperatorCommand::Stop
        } else {
            OperatorCommand::Unknown(trimmed.to_string())
        }
    }
}

/// Why the console stopped waiting.
#[derive(Debug, PartialEq)]
pub enum StopReason {
    Command,
    InputClosed,
}

/// Reads lines until the stop command arrives or input reaches EOF.
pub async fn wait_for_stop<R: AsyncBufRead + Unpin>(reader: R) -> StopReason {
    let mut lines = reader.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match OperatorCommand::parse(&line) {
                OperatorCommand::Stop => {
                    info!("Stop command received");
                    return StopReason::Command;
                }
                OperatorCommand::Empty => {}
                OperatorCommand::Unknown(cmd) => {
                    warn!("Unknown command '{}', type '{}' to stop the server", cmd, STOP_COMMAND);
                }
            },
            Ok(None) => return StopReason::InputClosed,
            Err(e) => {
                warn!("Failed to read operator input: {}", e);
                return StopReason::InputClosed;
            }
        }
    }
}
