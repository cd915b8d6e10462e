//! Fixed-layout message bodies and the `decode_one`/`encode` entry points.
//!
//! All integers are little-endian. String fields are fixed-width ASCII,
//! NUL-padded. Field order matches `examples/original_source/client/s_client.py`'s
//! `struct.unpack` calls exactly, which is the canonical layout this
//! codec targets.

use super::error::CodecError;
use super::header::{HEADER_LEN, Header};
use std::fmt;

pub const MSG_LOGIN: u8 = b'L';
pub const MSG_LOGIN_RESP: u8 = b'R';
pub const MSG_NEW_ORDER: u8 = b'N';
pub const MSG_CANCEL: u8 = b'C';
pub const MSG_MD_QUERY: u8 = b'M';
pub const MSG_SUBSCRIBE: u8 = b'Q';
pub const MSG_EXEC_REPORT: u8 = b'E';
pub const MSG_SNAPSHOT: u8 = b'S';
pub const MSG_TICKER: u8 = b'T';

const SYMBOL_LEN: usize = 10;
const LOGIN_FIELD_LEN: usize = 20;
const LOGIN_MSG_LEN: usize = 50;

const LOGIN_BODY_LEN: u16 = (LOGIN_FIELD_LEN * 2) as u16; // 40
const LOGIN_RESP_BODY_LEN: u16 = 1 + LOGIN_MSG_LEN as u16; // 51
const NEW_ORDER_BODY_LEN: u16 = 8 + SYMBOL_LEN as u16 + 1 + 1 + 8 + 8; // 36
const CANCEL_BODY_LEN: u16 = 8 + SYMBOL_LEN as u16 + 1; // 19
const MD_QUERY_BODY_LEN: u16 = SYMBOL_LEN as u16; // 10
const SUBSCRIBE_BODY_LEN: u16 = SYMBOL_LEN as u16 + 1; // 11
const EXEC_REPORT_BODY_LEN: u16 = 8 + 8 + SYMBOL_LEN as u16 + 1 + 8 + 8 + 8 + 1; // 52

/// Number of price levels per side carried in a `'S'` snapshot. The wire
/// body is a fixed layout: a snapshot can never report more than this
/// many levels on either side, regardless of how deep the book actually
/// is or how a caller configures book depth.
pub const DEPTH: usize = 5;
const SNAPSHOT_BODY_LEN: u16 = SYMBOL_LEN as u16 + 4 + 4 + (16 * DEPTH as u16 * 2); // 178
const TICKER_BODY_LEN: u16 = SYMBOL_LEN as u16 + 8 + 8 + 8 + 1; // 35

/// Fixed-width, NUL-padded ASCII identifier. Equality is byte-wise over
/// the full 10-byte field, per §3 of the protocol spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub [u8; SYMBOL_LEN]);

impl Symbol {
    /// Builds a [`Symbol`] from a str, right-padding with NUL. Returns
    /// `None` if `s` does not fit in the 10-byte field — the caller
    /// treats that as a protocol error (§9 open question (a)).
    pub fn from_str(s: &str) -> Option<Symbol> {
        if !s.is_ascii() || s.len() > SYMBOL_LEN {
            return None;
        }
        let mut buf = [0u8; SYMBOL_LEN];
        buf[..s.len()].copy_from_slice(s.as_bytes());
        Some(Symbol(buf))
    }

    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(SYMBOL_LEN);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `{BUY=0, SELL=1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    fn from_u8(b: u8) -> Option<Side> {
        match b {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// `{MARKET=0, LIMIT=1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    Market = 0,
    Limit = 1,
}

impl OrderKind {
    fn from_u8(b: u8) -> Option<OrderKind> {
        match b {
            0 => Some(OrderKind::Market),
            1 => Some(OrderKind::Limit),
            _ => None,
        }
    }
}

/// `{NEW=0, PARTIAL=1, FILLED=2, CANCELLED=3, REJECTED=4}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    New = 0,
    Partial = 1,
    Filled = 2,
    Cancelled = 3,
    Rejected = 4,
}

impl Status {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Messages a client may send (`'L' 'N' 'C' 'M' 'Q'`).
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Login {
        user: [u8; LOGIN_FIELD_LEN],
        password: [u8; LOGIN_FIELD_LEN],
    },
    NewOrder {
        client_order_id: u64,
        symbol: Symbol,
        side: Side,
        kind: OrderKind,
        price: f64,
        quantity: u64,
    },
    Cancel {
        engine_order_id: u64,
        symbol: Symbol,
        side: Side,
    },
    MarketDataQuery {
        symbol: Symbol,
    },
    Subscribe {
        symbol: Symbol,
        subscribe: bool,
    },
}

/// A single top-of-book level, used inside [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    pub price: f64,
    pub quantity: u64,
}

/// `'E'` execution report body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecReport {
    pub client_order_id: u64,
    pub execution_id: u64,
    pub symbol: Symbol,
    pub side: Side,
    pub price: f64,
    pub quantity: u64,
    pub filled_qty: u64,
    pub status: Status,
}

/// `'S'` snapshot body: top-5 bids and asks, zero-filled beyond depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub symbol: Symbol,
    pub n_bids: u32,
    pub n_asks: u32,
    pub bids: [Level; DEPTH],
    pub asks: [Level; DEPTH],
}

/// `'T'` ticker body: one per-trade print.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    pub symbol: Symbol,
    pub price: f64,
    pub quantity: u64,
    pub timestamp_ns: u64,
    pub aggressor_side: Side,
}

/// Messages the server may send (`'R' 'E' 'S' 'T'`).
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    LoginResponse { ok: bool, message: String },
    ExecReport(ExecReport),
    Snapshot(Snapshot),
    Ticker(Ticker),
}

/// Result of attempting to decode one frame from the front of a buffer.
pub enum DecodeOutcome {
    /// A full message was decoded; consumes `consumed` bytes from the
    /// front of the buffer.
    Message {
        message: ClientMessage,
        seq_num: u16,
        consumed: usize,
    },
    /// Not enough bytes are buffered yet for a full frame.
    NeedMore,
    /// The frame carries a `msg_type` outside the known set. Per §4.2 this
    /// is not automatically fatal: an authenticated session logs and
    /// ignores it, while an unauthenticated session still treats it as a
    /// protocol violation. The frame's bytes are always fully consumed.
    UnknownType {
        msg_type: u8,
        seq_num: u16,
        consumed: usize,
    },
    /// The frame is malformed; the session must close.
    Error(CodecError),
}

fn read_symbol(buf: &[u8]) -> Symbol {
    let mut raw = [0u8; SYMBOL_LEN];
    raw.copy_from_slice(&buf[..SYMBOL_LEN]);
    Symbol(raw)
}

fn read_u64(buf: &[u8]) -> u64 {
    u64::from_le_bytes(buf[..8].try_into().unwrap())
}

fn read_f64(buf: &[u8]) -> f64 {
    f64::from_le_bytes(buf[..8].try_into().unwrap())
}

fn expect_len(msg_type: u8, total_len: u16, expected: u16) -> Result<(), CodecError> {
    if total_len != expected {
        return Err(CodecError::BodyLengthMismatch {
            msg_type,
            expected,
            actual: total_len,
        });
    }
    Ok(())
}

/// Attempts to decode exactly one client frame from the front of `buf`.
///
/// On success, the caller advances its buffer by the returned `consumed`
/// byte count; partial trailing bytes are left untouched. A declared
/// `total_len` above `max_frame_bytes` is reported as an error even if
/// the full frame has not yet arrived, so oversize frames are rejected
/// as soon as the header is visible rather than after buffering the
/// whole thing.
pub fn decode_one(buf: &[u8], max_frame_bytes: usize) -> DecodeOutcome {
    if buf.len() < HEADER_LEN {
        return DecodeOutcome::NeedMore;
    }
    let header = match Header::decode(buf) {
        Ok(h) => h,
        Err(e) => return DecodeOutcome::Error(e),
    };
    let total_len = header.total_len as usize;
    if total_len > max_frame_bytes {
        return DecodeOutcome::Error(CodecError::FrameTooLarge {
            total_len: header.total_len,
            max: max_frame_bytes,
        });
    }
    if buf.len() < total_len {
        return DecodeOutcome::NeedMore;
    }
    let body = &buf[HEADER_LEN..total_len];

    let message = match header.msg_type {
        MSG_LOGIN => {
            if let Err(e) = expect_len(header.msg_type, header.total_len, HEADER_LEN as u16 + LOGIN_BODY_LEN) {
                return DecodeOutcome::Error(e);
            }
            let mut user = [0u8; LOGIN_FIELD_LEN];
            let mut password = [0u8; LOGIN_FIELD_LEN];
            user.copy_from_slice(&body[..LOGIN_FIELD_LEN]);
            password.copy_from_slice(&body[LOGIN_FIELD_LEN..LOGIN_FIELD_LEN * 2]);
            ClientMessage::Login { user, password }
        }
        MSG_NEW_ORDER => {
            if let Err(e) = expect_len(header.msg_type, header.total_len, HEADER_LEN as u16 + NEW_ORDER_BODY_LEN) {
                return DecodeOutcome::Error(e);
            }
            let client_order_id = read_u64(&body[0..8]);
            let symbol = read_symbol(&body[8..18]);
            let side = match Side::from_u8(body[18]) {
                Some(s) => s,
                None => {
                    return DecodeOutcome::Error(CodecError::InvalidFieldValue {
                        msg_type: header.msg_type,
                        field: "side",
                        value: body[18],
                    });
                }
            };
            let kind = match OrderKind::from_u8(body[19]) {
                Some(k) => k,
                None => {
                    return DecodeOutcome::Error(CodecError::InvalidFieldValue {
                        msg_type: header.msg_type,
                        field: "type",
                        value: body[19],
                    });
                }
            };
            let price = read_f64(&body[20..28]);
            let quantity = read_u64(&body[28..36]);
            ClientMessage::NewOrder {
                client_order_id,
                symbol,
                side,
                kind,
                price,
                quantity,
            }
        }
        MSG_CANCEL => {
            if let Err(e) = expect_len(header.msg_type, header.total_len, HEADER_LEN as u16 + CANCEL_BODY_LEN) {
                return DecodeOutcome::Error(e);
            }
            let engine_order_id = read_u64(&body[0..8]);
            let symbol = read_symbol(&body[8..18]);
            let side = match Side::from_u8(body[18]) {
                Some(s) => s,
                None => {
                    return DecodeOutcome::Error(CodecError::InvalidFieldValue {
                        msg_type: header.msg_type,
                        field: "side",
                        value: body[18],
                    });
                }
            };
            ClientMessage::Cancel {
                engine_order_id,
                symbol,
                side,
            }
        }
        MSG_MD_QUERY => {
            if let Err(e) = expect_len(header.msg_type, header.total_len, HEADER_LEN as u16 + MD_QUERY_BODY_LEN) {
                return DecodeOutcome::Error(e);
            }
            ClientMessage::MarketDataQuery {
                symbol: read_symbol(&body[0..10]),
            }
        }
        MSG_SUBSCRIBE => {
            if let Err(e) = expect_len(header.msg_type, header.total_len, HEADER_LEN as u16 + SUBSCRIBE_BODY_LEN) {
                return DecodeOutcome::Error(e);
            }
            ClientMessage::Subscribe {
                symbol: read_symbol(&body[0..10]),
                subscribe: body[10] != 0,
            }
        }
        other => {
            return DecodeOutcome::UnknownType {
                msg_type: other,
                seq_num: header.seq_num,
                consumed: total_len,
            };
        }
    };

    DecodeOutcome::Message {
        message,
        seq_num: header.seq_num,
        consumed: total_len,
    }
}

/// Encodes a server-to-client message, including its header, into `out`.
pub fn encode(msg: &ServerMessage, seq_num: u16, out: &mut Vec<u8>) {
    match msg {
        ServerMessage::LoginResponse { ok, message } => {
            let header = Header {
                seq_num,
                msg_type: MSG_LOGIN_RESP,
                total_len: HEADER_LEN as u16 + LOGIN_RESP_BODY_LEN,
            };
            header.encode_into(out);
            out.push(if *ok { 1 } else { 0 });
            write_fixed_str(out, message, LOGIN_MSG_LEN);
        }
        ServerMessage::ExecReport(report) => {
            let header = Header {
                seq_num,
                msg_type: MSG_EXEC_REPORT,
                total_len: HEADER_LEN as u16 + EXEC_REPORT_BODY_LEN,
            };
            header.encode_into(out);
            out.extend_from_slice(&report.client_order_id.to_le_bytes());
            out.extend_from_slice(&report.execution_id.to_le_bytes());
            out.extend_from_slice(&report.symbol.0);
            out.push(report.side as u8);
            out.extend_from_slice(&report.price.to_le_bytes());
            out.extend_from_slice(&report.quantity.to_le_bytes());
            out.extend_from_slice(&report.filled_qty.to_le_bytes());
            out.push(report.status.as_u8());
        }
        ServerMessage::Snapshot(snap) => {
            let header = Header {
                seq_num,
                msg_type: MSG_SNAPSHOT,
                total_len: HEADER_LEN as u16 + SNAPSHOT_BODY_LEN,
            };
            header.encode_into(out);
            out.extend_from_slice(&snap.symbol.0);
            out.extend_from_slice(&snap.n_bids.to_le_bytes());
            out.extend_from_slice(&snap.n_asks.to_le_bytes());
            for level in &snap.bids {
                out.extend_from_slice(&level.price.to_le_bytes());
                out.extend_from_slice(&level.quantity.to_le_bytes());
            }
            for level in &snap.asks {
                out.extend_from_slice(&level.price.to_le_bytes());
                out.extend_from_slice(&level.quantity.to_le_bytes());
            }
        }
        ServerMessage::Ticker(ticker) => {
            let header = Header {
                seq_num,
                msg_type: MSG_TICKER,
                total_len: HEADER_LEN as u16 + TICKER_BODY_LEN,
            };
            header.encode_into(out);
            out.extend_from_slice(&ticker.symbol.0);
            out.extend_from_slice(&ticker.price.to_le_bytes());
            out.extend_from_slice(&ticker.quantity.to_le_bytes());
            out.extend_from_slice(&ticker.timestamp_ns.to_le_bytes());
            out.push(ticker.aggressor_side as u8);
        }
    }
}

fn write_fixed_str(out: &mut Vec<u8>, s: &str, width: usize) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(width);
    out.extend_from_slice(&bytes[..n]);
    out.resize(out.len() + (width - n), 0);
}
