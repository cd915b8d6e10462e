//! The resting-order record owned by a [`super::PriceLevel`].

use crate::wire::{OrderKind, Side, Status, Symbol};

/// Monotonic identifier assigned by the matching engine on acceptance.
pub type OrderId = u64;

/// A resting or in-flight order.
///
/// Attributes mirror §3 of the protocol spec exactly: `remaining_quantity`
/// is derived, never stored independently, so it can never drift from
/// `original_quantity - filled_quantity`.
#[derive(Debug, Clone)]
pub struct Order {
    pub engine_order_id: OrderId,
    pub client_order_id: u64,
    pub session_id: u64,
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderKind,
    pub price: f64,
    pub original_quantity: u64,
    pub filled_quantity: u64,
    pub status: Status,
}

impl Order {
    pub fn remaining_quantity(&self) -> u64 {
        self.original_quantity - self.filled_quantity
    }

    /// Applies a fill of `qty`, updating `filled_quantity` and `status`.
    ///
    /// `status` becomes `Filled` once nothing remains, otherwise `Partial`
    /// — callers that need the `New` status for an unfilled resting order
    /// set it directly after construction instead.
    pub fn apply_fill(&mut self, qty: u64) {
        debug_assert!(qty <= self.remaining_quantity());
        self.filled_quantity += qty;
        self.status = if self.remaining_quantity() == 0 {
            Status::Filled
        } else {
            Status::Partial
        };
    }
}
