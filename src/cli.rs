//! Command-line interface
//!
//! `-l ip -p port` runs the server, `-c ip -p port` runs a client. Anything
//! that does not resolve to one of those prints usage.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::net::{Ipv4Addr, SocketAddrV4};

const EXAMPLES: &str = "\
Examples:
    relay-chat -l 192.168.0.10 -p 5555    [start a server]
    relay-chat -c 192.168.0.10 -p 5555    [connect to a server]";

#[derive(Parser, Debug)]
#[command(name = "relay-chat", version, about = "Chat Server", after_help = EXAMPLES)]
pub struct Cli {
    /// IP address to listen on for incoming connections
    #[arg(short, long, value_name = "IP")]
    pub listen: Option<Ipv4Addr>,

    /// Port to use for the server or client
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Connect to a server as a client
    #[arg(short, long, value_name = "IP")]
    pub connect: Option<Ipv4Addr>,

    /// Name shown to other users (defaults to the login name)
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Mode {
    Serve(SocketAddrV4),
    Connect { server: SocketAddrV4, username: String },
}

/// What the process should do after parsing its arguments.
#[derive(Debug)]
pub enum Invocation {
    Run(Mode),
    /// Print the text and exit successfully.
    Usage(String),
}

impl Cli {
    /// Listen wins over connect; both need a port.
    pub fn mode(&self) -> Option<Mode> {
        let port = self.port?;

        if let Some(ip) = self.listen {
            return Some(Mode::Serve(SocketAddrV4::new(ip, port)));
        }

        self.connect.map(|ip| Mode::Connect {
            server: SocketAddrV4::new(ip, port),
            username: self.user.clone().unwrap_or_else(crate::chat::login_name),
        })
    }
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

pub fn parse_args<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        return Invocation::Usage(usage());
    }

    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.mode() {
            Some(mode) => Invocation::Run(mode),
            None => Invocation::Usage(usage()),
        },
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Invocation::Usage(e.to_string()),
            _ => Invocation::Usage(format!("{}\n{}", e.render(), usage())),
        },
    }
}
