//! Error handling
//!
//! Defines error types and fatal-error reporting.

pub mod handlers;
pub mod types;

pub use types::*;
