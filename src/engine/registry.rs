//! The id → locator index that makes cancellation O(1) (§3, §4.3).

use crate::orderbook::OrderId;
use crate::wire::{Side, Symbol};
use dashmap::DashMap;

/// Where a resting order lives, without owning it: the book, side and
/// price are enough for [`crate::orderbook::Book::remove_at`] to find
/// and remove it directly, with no scan.
#[derive(Debug, Clone, Copy)]
pub struct Locator {
    pub symbol: Symbol,
    pub side: Side,
    pub price: f64,
}

#[derive(Debug, Default)]
pub struct Registry {
    locators: DashMap<OrderId, Locator>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            locators: DashMap::new(),
        }
    }

    pub fn register(&self, id: OrderId, locator: Locator) {
        self.locators.insert(id, locator);
    }

    pub fn unregister(&self, id: OrderId) -> Option<Locator> {
        self.locators.remove(&id).map(|(_, v)| v)
    }

    pub fn lookup(&self, id: OrderId) -> Option<Locator> {
        self.locators.get(&id).map(|e| *e)
    }
}
