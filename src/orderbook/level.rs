//! A single price level: the FIFO queue of resting orders at one price.
//!
//! Grounded on the hybrid design the teacher crate documents for its own
//! `PriceLevel` (crate-level docs, "Previous Bottleneck"/"New
//! Implementation" section): a concurrent map keyed by order id for O(1)
//! lookup/removal, plus a FIFO of ids that preserves arrival order for
//! matching. Cancelling an order removes it from the map immediately and
//! leaves its id as a tombstone in the queue; the queue is drained lazily
//! as matching walks the front, so a cancel never has to scan.

use super::types::{Order, OrderId};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct PriceLevel {
    price: f64,
    total_quantity: AtomicU64,
    orders: DashMap<OrderId, Order>,
    queue: Mutex<VecDeque<OrderId>>,
}

impl PriceLevel {
    pub fn new(price: f64) -> Self {
        PriceLevel {
            price,
            total_quantity: AtomicU64::new(0),
            orders: DashMap::new(),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Aggregate remaining quantity across every live order at this level.
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity.load(Ordering::Acquire)
    }

    /// True once every order at this level has been matched away or
    /// cancelled. The level itself is then dropped from the book.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Appends a resting order to the tail of the FIFO queue.
    pub fn push_back(&self, order: Order) {
        self.total_quantity
            .fetch_add(order.remaining_quantity(), Ordering::AcqRel);
        let id = order.engine_order_id;
        self.orders.insert(id, order);
        self.queue.lock().unwrap().push_back(id);
    }

    /// Removes an order by id, wherever it sits in the queue. Returns the
    /// removed order. O(1): the queue entry is left as a tombstone and
    /// skipped the next time matching walks the front.
    pub fn remove(&self, id: OrderId) -> Option<Order> {
        let (_, order) = self.orders.remove(&id)?;
        self.total_quantity
            .fetch_sub(order.remaining_quantity(), Ordering::AcqRel);
        Some(order)
    }

    /// Returns the id of the order currently at the front of the queue,
    /// discarding any cancelled tombstones encountered along the way.
    pub fn front_id(&self) -> Option<OrderId> {
        let mut queue = self.queue.lock().unwrap();
        loop {
            let id = *queue.front()?;
            if self.orders.contains_key(&id) {
                return Some(id);
            }
            queue.pop_front();
        }
    }

    /// Applies a fill of `qty` to the order `id`, which must currently be
    /// at the front of the queue. When the order is fully filled it is
    /// popped from both the map and the queue.
    pub fn fill_front(&self, id: OrderId, qty: u64) -> Order {
        let mut entry = self.orders.get_mut(&id).expect("fill_front: id not resident");
        entry.apply_fill(qty);
        self.total_quantity.fetch_sub(qty, Ordering::AcqRel);
        let snapshot = entry.clone();
        let exhausted = snapshot.remaining_quantity() == 0;
        drop(entry);
        if exhausted {
            self.orders.remove(&id);
            self.queue.lock().unwrap().pop_front();
        }
        snapshot
    }

    /// Remaining quantity of a live order, used by the matching loop to
    /// size a trade before applying the fill.
    pub fn remaining_of(&self, id: OrderId) -> Option<u64> {
        self.orders.get(&id).map(|e| e.remaining_quantity())
    }

    #[cfg(test)]
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).map(|e| e.clone())
    }
}
