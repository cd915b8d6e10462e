//! C4: the cross-book matching algorithm described in §4.3 of the
//! protocol spec, plus `cancel` and `snapshot`.

use super::execution::Execution;
use super::registry::{Locator, Registry};
use crate::orderbook::{Book, Order, OrderBookError, OrderId};
use crate::util::current_time_nanos;
use crate::wire::{OrderKind, Side, Status, Symbol};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

/// A decoded `'N'` NewOrder, already past framing but not yet validated.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderRequest {
    pub client_order_id: u64,
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderKind,
    pub price: f64,
    pub quantity: u64,
}

/// A single trade print, used by the market-data publisher to build
/// `'T'` ticker frames. Distinct from [`Execution`]: one trade produces
/// two executions (aggressor + resting) but exactly one ticker.
#[derive(Debug, Clone, Copy)]
pub struct Trade {
    pub symbol: Symbol,
    pub price: f64,
    pub quantity: u64,
    pub aggressor_side: Side,
    pub timestamp_ns: u64,
}

#[derive(Debug, Default)]
pub struct SubmitOutcome {
    pub engine_order_id: Option<OrderId>,
    pub executions: Vec<Execution>,
    pub trades: Vec<Trade>,
}

#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(Execution),
    NotFound(Execution),
}

/// Owns every book, the order-id registry, and the monotonic id
/// counters. Per §5 of the protocol spec, every public method here is
/// meant to be called from a single serializing point (one reactor task
/// or one mutex-guarded critical section) so that price-time priority
/// has an unambiguous total order.
pub struct Engine {
    books: DashMap<Symbol, Book>,
    registry: Registry,
    next_order_id: AtomicU64,
    next_execution_id: AtomicU64,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            books: DashMap::new(),
            registry: Registry::new(),
            next_order_id: AtomicU64::new(1),
            next_execution_id: AtomicU64::new(1),
        }
    }

    fn next_order_id(&self) -> OrderId {
        self.next_order_id.fetch_add(1, Ordering::Relaxed)
    }

    fn next_execution_id(&self) -> u64 {
        self.next_execution_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Runs `f` with shared access to the book for `symbol`, creating it
    /// on first use. Used by the market-data publisher to build
    /// snapshots without going through `submit`/`cancel`.
    pub fn with_book<R>(&self, symbol: Symbol, f: impl FnOnce(&Book) -> R) -> R {
        let book = self.books.entry(symbol).or_insert_with(|| Book::new(symbol));
        f(&book)
    }

    /// §4.3: admits, matches, and (for a limit residual) rests a new
    /// order. Validation failures never reach the matching loop — they
    /// short-circuit to a single `REJECTED` execution.
    pub fn submit(&self, session_id: u64, req: NewOrderRequest) -> SubmitOutcome {
        if req.quantity == 0 || (req.kind == OrderKind::Limit && req.price <= 0.0) {
            warn!(
                client_order_id = req.client_order_id,
                symbol = %req.symbol,
                "rejecting order: non-positive price or zero quantity"
            );
            let exec = Execution {
                execution_id: self.next_execution_id(),
                session_id,
                client_order_id: req.client_order_id,
                symbol: req.symbol,
                side: req.side,
                price: req.price,
                original_quantity: req.quantity,
                filled_quantity_cumulative: 0,
                status: Status::Rejected,
            };
            return SubmitOutcome {
                engine_order_id: None,
                executions: vec![exec],
                trades: vec![],
            };
        }

        let engine_order_id = self.next_order_id();
        let mut aggressor = Order {
            engine_order_id,
            client_order_id: req.client_order_id,
            session_id,
            symbol: req.symbol,
            side: req.side,
            kind: req.kind,
            price: req.price,
            original_quantity: req.quantity,
            filled_quantity: 0,
            status: Status::New,
        };

        let mut executions = Vec::new();
        let mut trades = Vec::new();

        let book = self.books.entry(req.symbol).or_insert_with(|| Book::new(req.symbol));

        while aggressor.remaining_quantity() > 0 {
            let Some((resting_price, resting_id, resting_remaining)) = book.best_opposite_front(aggressor.side)
            else {
                break;
            };
            let crosses = match req.kind {
                OrderKind::Market => true,
                OrderKind::Limit => match aggressor.side {
                    Side::Buy => aggressor.price >= resting_price,
                    Side::Sell => aggressor.price <= resting_price,
                },
            };
            if !crosses {
                break;
            }

            let trade_qty = aggressor.remaining_quantity().min(resting_remaining);

            let resting_after = book.fill_best_opposite(aggressor.side, resting_id, trade_qty);
            aggressor.apply_fill(trade_qty);

            if resting_after.remaining_quantity() == 0 {
                self.registry.unregister(resting_after.engine_order_id);
            }

            trace!(
                symbol = %req.symbol,
                price = resting_price,
                qty = trade_qty,
                "matched trade"
            );

            trades.push(Trade {
                symbol: req.symbol,
                price: resting_price,
                quantity: trade_qty,
                aggressor_side: aggressor.side,
                timestamp_ns: current_time_nanos(),
            });

            executions.push(Execution {
                execution_id: self.next_execution_id(),
                session_id: resting_after.session_id,
                client_order_id: resting_after.client_order_id,
                symbol: resting_after.symbol,
                side: resting_after.side,
                price: resting_price,
                original_quantity: resting_after.original_quantity,
                filled_quantity_cumulative: resting_after.filled_quantity,
                status: resting_after.status,
            });
            executions.push(Execution {
                execution_id: self.next_execution_id(),
                session_id: aggressor.session_id,
                client_order_id: aggressor.client_order_id,
                symbol: aggressor.symbol,
                side: aggressor.side,
                price: resting_price,
                original_quantity: aggressor.original_quantity,
                filled_quantity_cumulative: aggressor.filled_quantity,
                status: aggressor.status,
            });
        }

        if let Err(err) = book.check_not_crossed() {
            self.fail_invariant(err);
        }

        let remaining = aggressor.remaining_quantity();
        if remaining > 0 {
            match req.kind {
                OrderKind::Limit => {
                    aggressor.status = if aggressor.filled_quantity == 0 {
                        Status::New
                    } else {
                        Status::Partial
                    };
                    self.registry.register(
                        engine_order_id,
                        Locator {
                            symbol: req.symbol,
                            side: req.side,
                            price: req.price,
                        },
                    );
                    debug!(
                        engine_order_id,
                        symbol = %req.symbol,
                        price = req.price,
                        remaining,
                        "resting order"
                    );
                    book.insert_resting(aggressor.clone());
                    executions.push(Execution {
                        execution_id: self.next_execution_id(),
                        session_id: aggressor.session_id,
                        client_order_id: aggressor.client_order_id,
                        symbol: aggressor.symbol,
                        side: aggressor.side,
                        price: aggressor.price,
                        original_quantity: aggressor.original_quantity,
                        filled_quantity_cumulative: aggressor.filled_quantity,
                        status: aggressor.status,
                    });
                }
                OrderKind::Market => {
                    aggressor.status = Status::Cancelled;
                    debug!(
                        engine_order_id,
                        symbol = %req.symbol,
                        remaining,
                        "dropping unfilled market residual"
                    );
                    executions.push(Execution {
                        execution_id: self.next_execution_id(),
                        session_id: aggressor.session_id,
                        client_order_id: aggressor.client_order_id,
                        symbol: aggressor.symbol,
                        side: aggressor.side,
                        price: aggressor.price,
                        original_quantity: aggressor.original_quantity,
                        filled_quantity_cumulative: aggressor.filled_quantity,
                        status: aggressor.status,
                    });
                }
            }
        }

        SubmitOutcome {
            engine_order_id: Some(engine_order_id),
            executions,
            trades,
        }
    }

    /// §4.3 `cancel`: O(1) lookup via the registry, then removal from
    /// the book. Unknown ids, and ids that exist under a different
    /// symbol/side than claimed, are both `NotFound` — state is left
    /// untouched either way.
    pub fn cancel(&self, session_id: u64, engine_order_id: OrderId, symbol: Symbol, side: Side) -> CancelOutcome {
        let Some(locator) = self.registry.lookup(engine_order_id) else {
            return CancelOutcome::NotFound(Execution {
                execution_id: self.next_execution_id(),
                session_id,
                client_order_id: 0,
                symbol,
                side,
                price: 0.0,
                original_quantity: 0,
                filled_quantity_cumulative: 0,
                status: Status::Rejected,
            });
        };
        if locator.symbol != symbol || locator.side != side {
            return CancelOutcome::NotFound(Execution {
                execution_id: self.next_execution_id(),
                session_id,
                client_order_id: 0,
                symbol,
                side,
                price: 0.0,
                original_quantity: 0,
                filled_quantity_cumulative: 0,
                status: Status::Rejected,
            });
        }

        let Some(book) = self.books.get(&locator.symbol) else {
            self.registry.unregister(engine_order_id);
            return CancelOutcome::NotFound(Execution {
                execution_id: self.next_execution_id(),
                session_id,
                client_order_id: 0,
                symbol,
                side,
                price: 0.0,
                original_quantity: 0,
                filled_quantity_cumulative: 0,
                status: Status::Rejected,
            });
        };

        match book.remove_at(locator.side, locator.price, engine_order_id) {
            Some(mut order) => {
                self.registry.unregister(engine_order_id);
                order.status = Status::Cancelled;
                debug!(engine_order_id, symbol = %symbol, "cancelled resting order");
                CancelOutcome::Cancelled(Execution {
                    execution_id: self.next_execution_id(),
                    session_id: order.session_id,
                    client_order_id: order.client_order_id,
                    symbol: order.symbol,
                    side: order.side,
                    price: order.price,
                    original_quantity: order.original_quantity,
                    filled_quantity_cumulative: order.filled_quantity,
                    status: Status::Cancelled,
                })
            }
            None => {
                self.registry.unregister(engine_order_id);
                CancelOutcome::NotFound(Execution {
                    execution_id: self.next_execution_id(),
                    session_id,
                    client_order_id: 0,
                    symbol,
                    side,
                    price: 0.0,
                    original_quantity: 0,
                    filled_quantity_cumulative: 0,
                    status: Status::Rejected,
                })
            }
        }
    }

    /// Used by internal invariant checks; an engine that ever observes
    /// `OrderBookError::InvariantViolation` aborts the process (§7).
    pub fn fail_invariant(&self, err: OrderBookError) -> ! {
        tracing::error!(error = %err, "internal invariant violation, aborting");
        std::process::abort();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
