//! The immutable execution record produced by a fill or a cancel.

use crate::wire::{ExecReport, Side, Status, Symbol};

/// One execution event. §3 of the protocol spec defines this as an
/// immutable record; the engine never mutates one after construction.
#[derive(Debug, Clone, Copy)]
pub struct Execution {
    pub execution_id: u64,
    pub session_id: u64,
    pub client_order_id: u64,
    pub symbol: Symbol,
    pub side: Side,
    pub price: f64,
    pub original_quantity: u64,
    pub filled_quantity_cumulative: u64,
    pub status: Status,
}

impl Execution {
    pub fn to_exec_report(self) -> ExecReport {
        ExecReport {
            client_order_id: self.client_order_id,
            execution_id: self.execution_id,
            symbol: self.symbol,
            side: self.side,
            price: self.price,
            quantity: self.original_quantity,
            filled_qty: self.filled_quantity_cumulative,
            status: self.status,
        }
    }
}
