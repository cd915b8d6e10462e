//! Binary wire protocol: fixed-layout messages behind a 5-byte header.

mod error;
mod header;
mod message;

pub use error::CodecError;
pub use header::{HEADER_LEN, Header};
pub use message::{
    ClientMessage, DEPTH, DecodeOutcome, ExecReport, Level, OrderKind, ServerMessage, Side,
    Snapshot, Status, Symbol, Ticker, decode_one, encode,
};
