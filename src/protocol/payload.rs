//! Chat payload convention
//!
//! Clients send `base64("sender:text")`. The encoding only keeps arbitrary
//! text transport-safe; it provides no confidentiality. The server relays the
//! encoded bytes without looking at them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::PayloadError;

pub const SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
}

/// Encode a message from `sender` for the wire.
pub fn encode(sender: &str, text: &str) -> Vec<u8> {
    let joined = format!("{}{}{}", sender, SEPARATOR, text);
    STANDARD.encode(joined).into_bytes()
}

/// Decode bytes received from the server. The sender ends at the first
/// separator; the text may contain more of them.
pub fn decode(bytes: &[u8]) -> Result<ChatMessage, PayloadError> {
    let raw = STANDARD.decode(bytes.trim_ascii())?;
    let joined = String::from_utf8(raw)?;

    let (sender, text) = joined
        .split_once(SEPARATOR)
        .ok_or(PayloadError::MissingSeparator)?;

    Ok(ChatMessage {
        sender: sender.to_string(),
        text: text.to_string(),
    })
}
