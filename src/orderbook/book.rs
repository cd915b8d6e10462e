//! The per-symbol book: two price-ordered collections of price levels.
//!
//! Bids and asks are stored in separate `crossbeam_skiplist::SkipMap`s,
//! mirroring the teacher crate's choice of a lock-free skip list for
//! price-ordered level storage (`orderbook::book::OrderBook` keeps its
//! sides in `crossbeam_skiplist::SkipMap`s for the same reason: cheap
//! concurrent reads of top-of-book while the engine mutates).

use super::error::OrderBookError;
use super::level::PriceLevel;
use crate::wire::{Side, Symbol};
use crossbeam_skiplist::SkipMap;

/// Ascending key: `SkipMap::front()` yields the lowest price, i.e. the
/// best ask.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AskKey(f64);

impl Eq for AskKey {}
impl PartialOrd for AskKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for AskKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).expect("NaN price")
    }
}

/// Reversed key: `SkipMap::front()` yields the highest price, i.e. the
/// best bid.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BidKey(f64);

impl Eq for BidKey {}
impl PartialOrd for BidKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for BidKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.0.partial_cmp(&self.0).expect("NaN price")
    }
}

pub struct Book {
    symbol: Symbol,
    bids: SkipMap<BidKey, PriceLevel>,
    asks: SkipMap<AskKey, PriceLevel>,
}

impl Book {
    pub fn new(symbol: Symbol) -> Self {
        Book {
            symbol,
            bids: SkipMap::new(),
            asks: SkipMap::new(),
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn best_bid_price(&self) -> Option<f64> {
        self.bids.front().map(|e| e.key().0)
    }

    pub fn best_ask_price(&self) -> Option<f64> {
        self.asks.front().map(|e| e.key().0)
    }

    /// Returns the front (best-priced, then oldest) resting order on the
    /// book opposite `aggressor_side`: its price, id, and remaining
    /// quantity, so the matching loop can size a trade in one lookup.
    pub fn best_opposite_front(&self, aggressor_side: Side) -> Option<(f64, super::types::OrderId, u64)> {
        match aggressor_side {
            Side::Buy => self.asks.front().and_then(|e| {
                let level = e.value();
                let id = level.front_id()?;
                let remaining = level.remaining_of(id)?;
                Some((e.key().0, id, remaining))
            }),
            Side::Sell => self.bids.front().and_then(|e| {
                let level = e.value();
                let id = level.front_id()?;
                let remaining = level.remaining_of(id)?;
                Some((e.key().0, id, remaining))
            }),
        }
    }

    /// Applies a fill of `qty` to the order at the front of the best
    /// opposite-side level, dropping the level if it becomes empty.
    /// Returns the updated (post-fill) order record.
    pub fn fill_best_opposite(
        &self,
        aggressor_side: Side,
        id: super::types::OrderId,
        qty: u64,
    ) -> super::types::Order {
        let (level_entry_empty, order) = match aggressor_side {
            Side::Buy => {
                let entry = self.asks.front().expect("fill_best_opposite: no ask level");
                let order = entry.value().fill_front(id, qty);
                (entry.value().is_empty(), order)
            }
            Side::Sell => {
                let entry = self.bids.front().expect("fill_best_opposite: no bid level");
                let order = entry.value().fill_front(id, qty);
                (entry.value().is_empty(), order)
            }
        };
        if level_entry_empty {
            self.remove_level_if_empty(aggressor_side.opposite(), order.price);
        }
        order
    }

    /// Inserts a resting order at its limit price, creating the level if
    /// it does not already exist.
    pub fn insert_resting(&self, order: super::types::Order) {
        let side = order.side;
        let price = order.price;
        match side {
            Side::Buy => {
                let key = BidKey(price);
                if self.bids.get(&key).is_none() {
                    self.bids.insert(key, PriceLevel::new(price));
                }
                self.bids.get(&key).unwrap().value().push_back(order);
            }
            Side::Sell => {
                let key = AskKey(price);
                if self.asks.get(&key).is_none() {
                    self.asks.insert(key, PriceLevel::new(price));
                }
                self.asks.get(&key).unwrap().value().push_back(order);
            }
        }
    }

    /// Removes a specific resting order by id, given the side and price
    /// it rests at. Returns the removed order.
    pub fn remove_at(&self, side: Side, price: f64, id: super::types::OrderId) -> Option<super::types::Order> {
        let removed = match side {
            Side::Buy => self.bids.get(&BidKey(price)).and_then(|e| e.value().remove(id)),
            Side::Sell => self.asks.get(&AskKey(price)).and_then(|e| e.value().remove(id)),
        };
        if removed.is_some() {
            self.remove_level_if_empty(side, price);
        }
        removed
    }

    fn remove_level_if_empty(&self, side: Side, price: f64) {
        match side {
            Side::Buy => {
                if let Some(e) = self.bids.get(&BidKey(price)) {
                    if e.value().is_empty() {
                        e.remove();
                    }
                }
            }
            Side::Sell => {
                if let Some(e) = self.asks.get(&AskKey(price)) {
                    if e.value().is_empty() {
                        e.remove();
                    }
                }
            }
        }
    }

    /// Top `depth` levels on each side as `(price, aggregate_quantity)`.
    pub fn depth(&self, depth: usize) -> (Vec<(f64, u64)>, Vec<(f64, u64)>) {
        let bids = self
            .bids
            .iter()
            .take(depth)
            .map(|e| (e.key().0, e.value().total_quantity()))
            .collect();
        let asks = self
            .asks
            .iter()
            .take(depth)
            .map(|e| (e.key().0, e.value().total_quantity()))
            .collect();
        (bids, asks)
    }

    /// The book must never be crossed at rest (§3, §8 invariant 2). Unlike
    /// a `debug_assert!`, this runs in every build — a crossed book means
    /// the matching loop has a bug, and §7 requires that to be fatal in
    /// production, not just in debug builds.
    pub fn check_not_crossed(&self) -> Result<(), OrderBookError> {
        if let (Some(bid), Some(ask)) = (self.best_bid_price(), self.best_ask_price()) {
            if bid >= ask {
                return Err(OrderBookError::InvariantViolation {
                    symbol: self.symbol,
                    side: Side::Buy,
                    detail: format!("book crossed at rest: best_bid={bid} best_ask={ask}"),
                });
            }
        }
        Ok(())
    }
}
