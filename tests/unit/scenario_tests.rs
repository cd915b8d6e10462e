//! End-to-end scenarios driven directly against [`Engine`], bypassing
//! sockets and the session state machine entirely.

use matching_engine::engine::{CancelOutcome, Engine, NewOrderRequest};
use matching_engine::wire::{OrderKind, Side, Status, Symbol};

fn sym(s: &str) -> Symbol {
    Symbol::from_str(s).unwrap()
}

fn limit(client_order_id: u64, side: Side, price: f64, quantity: u64) -> NewOrderRequest {
    NewOrderRequest {
        client_order_id,
        symbol: sym("AAPL"),
        side,
        kind: OrderKind::Limit,
        price,
        quantity,
    }
}

#[test]
fn resting_limit_order_with_no_cross_gets_new_status() {
    let engine = Engine::new();
    let outcome = engine.submit(1, limit(1, Side::Buy, 100.0, 10));
    assert!(outcome.trades.is_empty());
    let last = outcome.executions.last().unwrap();
    assert_eq!(last.status, Status::New);
    assert!(outcome.engine_order_id.is_some());

    let (bids, asks) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert_eq!(bids, vec![(100.0, 10)]);
    assert!(asks.is_empty());
}

#[test]
fn crossing_limit_order_fully_fills_resting_order() {
    let engine = Engine::new();
    engine.submit(1, limit(1, Side::Sell, 100.0, 10));
    let outcome = engine.submit(2, limit(2, Side::Buy, 100.0, 10));

    assert_eq!(outcome.trades.len(), 1);
    assert_eq!(outcome.trades[0].price, 100.0);
    assert_eq!(outcome.trades[0].quantity, 10);

    let statuses: Vec<_> = outcome.executions.iter().map(|e| e.status).collect();
    assert!(statuses.contains(&Status::Filled));

    let (bids, asks) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert!(bids.is_empty());
    assert!(asks.is_empty());
}

#[test]
fn partial_fill_leaves_residual_resting_with_partial_status() {
    let engine = Engine::new();
    engine.submit(1, limit(1, Side::Sell, 100.0, 4));
    let outcome = engine.submit(2, limit(2, Side::Buy, 100.0, 10));

    assert_eq!(outcome.trades.len(), 1);
    assert_eq!(outcome.trades[0].quantity, 4);

    let tail = outcome.executions.last().unwrap();
    assert_eq!(tail.status, Status::Partial);
    assert_eq!(tail.filled_quantity_cumulative, 4);

    let (bids, _) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert_eq!(bids, vec![(100.0, 6)]);
}

#[test]
fn market_order_walks_multiple_price_levels() {
    let engine = Engine::new();
    engine.submit(1, limit(1, Side::Sell, 100.0, 5));
    engine.submit(2, limit(2, Side::Sell, 101.0, 5));

    let outcome = engine.submit(
        3,
        NewOrderRequest {
            client_order_id: 3,
            symbol: sym("AAPL"),
            side: Side::Buy,
            kind: OrderKind::Market,
            price: 0.0,
            quantity: 10,
        },
    );

    assert_eq!(outcome.trades.len(), 2);
    assert_eq!(outcome.trades[0].price, 100.0);
    assert_eq!(outcome.trades[1].price, 101.0);

    let (_, asks) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert!(asks.is_empty());
}

#[test]
fn market_order_against_empty_book_is_cancelled_with_no_fill() {
    let engine = Engine::new();
    let outcome = engine.submit(
        1,
        NewOrderRequest {
            client_order_id: 1,
            symbol: sym("AAPL"),
            side: Side::Buy,
            kind: OrderKind::Market,
            price: 0.0,
            quantity: 10,
        },
    );
    assert!(outcome.trades.is_empty());
    let last = outcome.executions.last().unwrap();
    assert_eq!(last.status, Status::Cancelled);
    assert_eq!(last.filled_quantity_cumulative, 0);
}

#[test]
fn market_order_residual_is_dropped_not_left_resting() {
    let engine = Engine::new();
    engine.submit(1, limit(1, Side::Sell, 100.0, 3));
    let outcome = engine.submit(
        2,
        NewOrderRequest {
            client_order_id: 2,
            symbol: sym("AAPL"),
            side: Side::Buy,
            kind: OrderKind::Market,
            price: 0.0,
            quantity: 10,
        },
    );
    let last = outcome.executions.last().unwrap();
    assert_eq!(last.status, Status::Cancelled);
    assert_eq!(last.filled_quantity_cumulative, 3);

    let (bids, _) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert!(bids.is_empty(), "market residual must never rest on the book");
}

#[test]
fn limit_order_inside_the_spread_never_matches() {
    let engine = Engine::new();
    engine.submit(1, limit(1, Side::Sell, 101.0, 10));
    engine.submit(2, limit(2, Side::Buy, 99.0, 10));

    let (bids, asks) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert_eq!(bids, vec![(99.0, 10)]);
    assert_eq!(asks, vec![(101.0, 10)]);
}

#[test]
fn cancel_removes_resting_order_and_frees_the_level() {
    let engine = Engine::new();
    let outcome = engine.submit(1, limit(1, Side::Buy, 100.0, 10));
    let id = outcome.engine_order_id.unwrap();

    match engine.cancel(1, id, sym("AAPL"), Side::Buy) {
        CancelOutcome::Cancelled(exec) => assert_eq!(exec.status, Status::Cancelled),
        CancelOutcome::NotFound(_) => panic!("expected Cancelled"),
    }

    let (bids, _) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert!(bids.is_empty());
}

#[test]
fn cancel_of_unknown_order_id_is_rejected_without_side_effects() {
    let engine = Engine::new();
    match engine.cancel(1, 9999, sym("AAPL"), Side::Buy) {
        CancelOutcome::NotFound(exec) => assert_eq!(exec.status, Status::Rejected),
        CancelOutcome::Cancelled(_) => panic!("expected NotFound"),
    }
}

#[test]
fn cancel_with_mismatched_side_is_rejected() {
    let engine = Engine::new();
    let outcome = engine.submit(1, limit(1, Side::Buy, 100.0, 10));
    let id = outcome.engine_order_id.unwrap();

    match engine.cancel(1, id, sym("AAPL"), Side::Sell) {
        CancelOutcome::NotFound(exec) => assert_eq!(exec.status, Status::Rejected),
        CancelOutcome::Cancelled(_) => panic!("expected NotFound due to side mismatch"),
    }

    // the order must still be resting under its real side
    let (bids, _) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert_eq!(bids, vec![(100.0, 10)]);
}

#[test]
fn zero_quantity_order_is_rejected_before_matching() {
    let engine = Engine::new();
    let outcome = engine.submit(1, limit(1, Side::Buy, 100.0, 0));
    assert!(outcome.engine_order_id.is_none());
    assert_eq!(outcome.executions.len(), 1);
    assert_eq!(outcome.executions[0].status, Status::Rejected);
}

#[test]
fn non_positive_limit_price_is_rejected_before_matching() {
    let engine = Engine::new();
    let outcome = engine.submit(1, limit(1, Side::Buy, 0.0, 10));
    assert!(outcome.engine_order_id.is_none());
    assert_eq!(outcome.executions[0].status, Status::Rejected);
}

#[test]
fn fifo_priority_within_a_price_level_is_preserved() {
    let engine = Engine::new();
    engine.submit(1, limit(1, Side::Sell, 100.0, 5));
    engine.submit(2, limit(2, Side::Sell, 100.0, 5));

    let outcome = engine.submit(3, limit(3, Side::Buy, 100.0, 5));
    assert_eq!(outcome.trades.len(), 1);
    // the first resting order (session 1) must be the one that traded
    let resting_fill = outcome
        .executions
        .iter()
        .find(|e| e.session_id == 1)
        .expect("session 1's order should have traded first");
    assert_eq!(resting_fill.filled_quantity_cumulative, 5);
}
