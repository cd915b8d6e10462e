//! Server configuration, parsed from the command line.

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default depth (levels per side) carried in a market-data snapshot.
pub const DEFAULT_BOOK_DEPTH: usize = 5;

/// Default safety cap on a single inbound frame, per §4.2 of the protocol
/// spec. A frame declaring a larger `total_len` closes the session.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 4096;

/// Command-line arguments for the matching engine server.
#[derive(Debug, Parser)]
#[command(name = "matching-engine", about = "Price-time priority matching engine and market-data server")]
pub struct Args {
    /// Address to bind the listening socket to.
    #[arg(long, env = "ME_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port to accept client connections on.
    #[arg(long, env = "ME_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log verbosity: trace, debug, info, warn, error.
    #[arg(long = "log-level", env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Safety cap, in bytes, on a single inbound frame's declared length.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_BYTES)]
    pub max_frame_bytes: usize,

    /// Number of price levels per side included in a market-data snapshot.
    #[arg(long, default_value_t = DEFAULT_BOOK_DEPTH)]
    pub book_depth: usize,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub max_frame_bytes: usize,
    pub book_depth: usize,
}

impl Config {
    /// Builds a [`Config`] from parsed CLI arguments.
    ///
    /// Returns `Err` with a message suitable for a process-exit-2 bad-args
    /// path when `host` does not parse as an IP address.
    pub fn from_args(args: Args) -> Result<Self, String> {
        let ip: IpAddr = args
            .host
            .parse()
            .or_else(|_| {
                if args.host == "localhost" {
                    Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
                } else {
                    Err(())
                }
            })
            .map_err(|_| format!("invalid --host value: {}", args.host))?;

        if args.book_depth > DEFAULT_BOOK_DEPTH {
            return Err(format!(
                "--book-depth {} exceeds the fixed snapshot wire layout's {DEFAULT_BOOK_DEPTH} levels per side",
                args.book_depth
            ));
        }

        Ok(Config {
            bind_addr: SocketAddr::new(ip, args.port),
            log_level: args.log_level,
            max_frame_bytes: args.max_frame_bytes,
            book_depth: args.book_depth,
        })
    }
}
