//! Client mode
//!
//! An interactive terminal client for the relay server.

pub mod input;
pub mod session;

pub use session::run;

const LOGIN_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];
const FALLBACK_USERNAME: &str = "anonymous";

/// Name of the logged-in user, used when `--user` is not given.
pub fn login_name() -> String {
    LOGIN_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_USERNAME.to_string())
}
