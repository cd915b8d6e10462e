//! Order book error types.
//!
//! Follows the teacher crate's manual `Display`/`Error` idiom rather than
//! a derive macro: a `#[non_exhaustive]` enum with one variant per
//! failure mode, each carrying the context needed to log or report it.

use crate::wire::{Side, Symbol};
use std::fmt;

#[derive(Debug)]
#[non_exhaustive]
pub enum OrderBookError {
    /// Cancel target does not exist in this book's id index, or exists
    /// under a different symbol/side than the request claimed.
    OrderNotFound { engine_order_id: u64 },

    /// Rejected at admission: non-positive price or zero quantity.
    InvalidOrder { reason: &'static str },

    /// A defensive check (§3 invariants) failed. The caller must treat
    /// this as fatal and abort the process — it indicates a bug in the
    /// matching loop, not a reachable client input.
    InvariantViolation {
        symbol: Symbol,
        side: Side,
        detail: String,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::OrderNotFound { engine_order_id } => {
                write!(f, "order {engine_order_id} not found")
            }
            OrderBookError::InvalidOrder { reason } => {
                write!(f, "invalid order: {reason}")
            }
            OrderBookError::InvariantViolation {
                symbol,
                side,
                detail,
            } => {
                write!(f, "invariant violation on {symbol} {side}: {detail}")
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
