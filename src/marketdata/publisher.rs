//! Subscriber bookkeeping and snapshot/ticker fan-out.

use crate::engine::{Engine, Trade};
use crate::orderbook::Book;
use crate::session::SessionRegistry;
use crate::wire::{DEPTH, Level, ServerMessage, Snapshot, Symbol, Ticker};
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use tracing::trace;

/// `'S'` snapshot bodies are a fixed `[Level; DEPTH]` layout on the wire,
/// so `n_bids`/`n_asks` can never legitimately exceed `DEPTH` — clamp
/// here rather than trust the caller's requested depth.
fn build_snapshot(book: &Book, symbol: Symbol, depth: usize) -> Snapshot {
    let depth = depth.min(DEPTH);
    let (bid_depth, ask_depth) = book.depth(depth);
    let mut bids = [Level { price: 0.0, quantity: 0 }; DEPTH];
    let mut asks = [Level { price: 0.0, quantity: 0 }; DEPTH];
    for (i, (price, qty)) in bid_depth.iter().take(DEPTH).enumerate() {
        bids[i] = Level { price: *price, quantity: *qty };
    }
    for (i, (price, qty)) in ask_depth.iter().take(DEPTH).enumerate() {
        asks[i] = Level { price: *price, quantity: *qty };
    }
    Snapshot {
        symbol,
        n_bids: bid_depth.len().min(DEPTH) as u32,
        n_asks: ask_depth.len().min(DEPTH) as u32,
        bids,
        asks,
    }
}

/// Per-symbol subscriber sets, plus the last snapshot published for each
/// symbol so mutations that don't touch the visible top-`depth` levels
/// don't trigger a redundant fan-out (§4.4).
pub struct Publisher {
    sessions: Arc<SessionRegistry>,
    subscribers: DashMap<Symbol, DashSet<u64>>,
    last_snapshot: DashMap<Symbol, Snapshot>,
    depth: usize,
}

impl Publisher {
    pub fn new(sessions: Arc<SessionRegistry>, depth: usize) -> Self {
        Publisher {
            sessions,
            subscribers: DashMap::new(),
            last_snapshot: DashMap::new(),
            depth: depth.min(DEPTH),
        }
    }

    /// `'Q'` with `flag=1`: adds `session_id` to the symbol's subscriber
    /// set and immediately unicasts a snapshot, per §4.4.
    pub fn subscribe(&self, engine: &Engine, symbol: Symbol, session_id: u64) {
        self.subscribers
            .entry(symbol)
            .or_insert_with(DashSet::new)
            .insert(session_id);
        trace!(%symbol, session_id, "subscribed");
        let snapshot = engine.with_book(symbol, |book| build_snapshot(book, symbol, self.depth));
        self.sessions.send(session_id, ServerMessage::Snapshot(snapshot));
    }

    /// `'Q'` with `flag=0`: idempotent — unsubscribing a session that was
    /// never subscribed is a no-op (§11 of the expanded spec).
    pub fn unsubscribe(&self, symbol: Symbol, session_id: u64) {
        if let Some(set) = self.subscribers.get(&symbol) {
            set.remove(&session_id);
        }
    }

    /// Drops `session_id` from every symbol's subscriber set. Called on
    /// disconnect (§5: "A session disconnect cancels its subscriptions
    /// immediately").
    pub fn unsubscribe_all(&self, session_id: u64) {
        for entry in self.subscribers.iter() {
            entry.value().remove(&session_id);
        }
    }

    /// `'M'` pull request: unicasts a snapshot without creating any
    /// subscription state.
    pub fn pull_snapshot(&self, engine: &Engine, symbol: Symbol, session_id: u64) {
        let snapshot = engine.with_book(symbol, |book| build_snapshot(book, symbol, self.depth));
        self.sessions.send(session_id, ServerMessage::Snapshot(snapshot));
    }

    /// Called after every accepted `submit`/`cancel`. Rebuilds the
    /// snapshot and fans it out to subscribers only if the visible
    /// top-`depth` levels actually changed.
    pub fn publish_mutation(&self, engine: &Engine, symbol: Symbol) {
        let snapshot = engine.with_book(symbol, |book| build_snapshot(book, symbol, self.depth));
        let changed = self
            .last_snapshot
            .get(&symbol)
            .map(|prev| *prev != snapshot)
            .unwrap_or(true);
        self.last_snapshot.insert(symbol, snapshot.clone());
        if !changed {
            return;
        }
        let Some(subs) = self.subscribers.get(&symbol) else {
            return;
        };
        for session_id in subs.iter() {
            self.sessions
                .send(*session_id, ServerMessage::Snapshot(snapshot.clone()));
        }
    }

    /// Fans a `'T'` ticker print out to every subscriber of the trade's
    /// symbol.
    pub fn publish_ticker(&self, trade: &Trade) {
        let Some(subs) = self.subscribers.get(&trade.symbol) else {
            return;
        };
        let ticker = Ticker {
            symbol: trade.symbol,
            price: trade.price,
            quantity: trade.quantity,
            timestamp_ns: trade.timestamp_ns,
            aggressor_side: trade.aggressor_side,
        };
        for session_id in subs.iter() {
            self.sessions.send(*session_id, ServerMessage::Ticker(ticker));
        }
    }
}
