//! Process entry point: parse arguments, bind the listening socket, and
//! run the accept loop. No global state — the engine, publisher, and
//! session registry are constructed once here and handed down by
//! reference (§9 design note).

use clap::Parser;
use matching_engine::config::{Args, Config};
use matching_engine::engine::Engine;
use matching_engine::marketdata::Publisher;
use matching_engine::net;
use matching_engine::session::SessionRegistry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = Args::parse();

    let config = match Config::from_args(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("bad configuration: {e}");
            return std::process::ExitCode::from(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, addr = %config.bind_addr, "failed to bind listening socket");
            return std::process::ExitCode::from(1);
        }
    };
    tracing::info!(addr = %config.bind_addr, "matching engine listening");

    let engine = Arc::new(Engine::new());
    let sessions = Arc::new(SessionRegistry::new());
    let publisher = Arc::new(Publisher::new(Arc::clone(&sessions), config.book_depth));

    net::run(listener, engine, publisher, sessions, config.max_frame_bytes).await;

    std::process::ExitCode::SUCCESS
}
