//! TCP acceptor and per-connection I/O tasks (§4.5).

mod acceptor;

pub use acceptor::run;
