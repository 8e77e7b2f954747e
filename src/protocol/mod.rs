//! Chat wire convention
//!
//! Used by client mode only. The relay treats payloads as opaque bytes.

pub mod payload;

pub use payload::{ChatMessage, decode, encode};
