//! End-to-end scenarios driven through [`Session`], [`Publisher`], and
//! [`SessionRegistry`] together — the layer `scenario_tests.rs`
//! deliberately bypasses. Covers S5 (subscribe fan-out) and S6
//! (disconnect does not cancel resting orders).

use matching_engine::engine::Engine;
use matching_engine::marketdata::Publisher;
use matching_engine::session::{Action, Session, SessionRegistry};
use matching_engine::wire::{ServerMessage, Side, Symbol};
use std::sync::Arc;
use tokio::sync::mpsc;

const MAX_FRAME: usize = 4096;

fn sym(s: &str) -> Symbol {
    Symbol::from_str(s).unwrap()
}

fn symbol_bytes(s: &str) -> [u8; 10] {
    let mut buf = [0u8; 10];
    buf[..s.len()].copy_from_slice(s.as_bytes());
    buf
}

fn header(msg_type: u8, total_len: u16, seq_num: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&seq_num.to_le_bytes());
    out.push(msg_type);
    out.extend_from_slice(&total_len.to_le_bytes());
    out
}

fn login_frame(seq_num: u16) -> Vec<u8> {
    let mut buf = header(b'L', 5 + 40, seq_num);
    let mut user = [0u8; 20];
    user[..5].copy_from_slice(b"alice");
    let mut pass = [0u8; 20];
    pass[..6].copy_from_slice(b"secret");
    buf.extend_from_slice(&user);
    buf.extend_from_slice(&pass);
    buf
}

fn subscribe_frame(seq_num: u16, symbol: &str, subscribe: bool) -> Vec<u8> {
    let mut buf = header(b'Q', 5 + 11, seq_num);
    buf.extend_from_slice(&symbol_bytes(symbol));
    buf.push(subscribe as u8);
    buf
}

fn new_order_frame(seq_num: u16, client_order_id: u64, symbol: &str, side: Side, price: f64, quantity: u64) -> Vec<u8> {
    let mut buf = header(b'N', 5 + 36, seq_num);
    buf.extend_from_slice(&client_order_id.to_le_bytes());
    buf.extend_from_slice(&symbol_bytes(symbol));
    buf.push(match side {
        Side::Buy => 0,
        Side::Sell => 1,
    });
    buf.push(1); // kind = limit
    buf.extend_from_slice(&price.to_le_bytes());
    buf.extend_from_slice(&quantity.to_le_bytes());
    buf
}

/// Builds a session wired to a fresh in-memory channel, already logged
/// in, returning the session alongside the channel's receiver so the
/// test can inspect everything sent to it.
fn logged_in_session(
    id: u64,
    engine: &Arc<Engine>,
    publisher: &Arc<Publisher>,
    sessions: &Arc<SessionRegistry>,
) -> (Session, mpsc::UnboundedReceiver<ServerMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    sessions.register(id, tx);
    let mut session = Session::new(id, MAX_FRAME, Arc::clone(engine), Arc::clone(publisher), Arc::clone(sessions));
    assert_eq!(session.feed(&login_frame(0)).unwrap(), Action::Continue);
    (session, rx)
}

#[test]
fn subscribing_session_gets_an_immediate_snapshot_then_fan_out_on_mutation() {
    let engine = Arc::new(Engine::new());
    let sessions = Arc::new(SessionRegistry::new());
    let publisher = Arc::new(Publisher::new(Arc::clone(&sessions), 5));

    let (mut subscriber, mut sub_rx) = logged_in_session(1, &engine, &publisher, &sessions);
    assert_eq!(subscriber.feed(&subscribe_frame(1, "AAPL", true)).unwrap(), Action::Continue);

    match sub_rx.try_recv().expect("immediate snapshot on subscribe") {
        ServerMessage::Snapshot(snap) => {
            assert_eq!(snap.n_bids, 0);
            assert_eq!(snap.n_asks, 0);
        }
        other => panic!("expected a snapshot, got {other:?}"),
    }
    assert!(sub_rx.try_recv().is_err(), "no further message until the book mutates");

    // A second session (not subscribed) rests an order on the book.
    let (mut resting, _resting_rx) = logged_in_session(2, &engine, &publisher, &sessions);
    assert_eq!(
        resting.feed(&new_order_frame(1, 100, "AAPL", Side::Buy, 50.0, 10)).unwrap(),
        Action::Continue
    );

    match sub_rx.try_recv().expect("mutation fan-out to the subscriber") {
        ServerMessage::Snapshot(snap) => {
            assert_eq!(snap.n_bids, 1);
            assert_eq!(snap.bids[0].price, 50.0);
            assert_eq!(snap.bids[0].quantity, 10);
        }
        other => panic!("expected a snapshot, got {other:?}"),
    }
}

#[test]
fn unsubscribed_session_never_receives_fan_out() {
    let engine = Arc::new(Engine::new());
    let sessions = Arc::new(SessionRegistry::new());
    let publisher = Arc::new(Publisher::new(Arc::clone(&sessions), 5));

    let (mut bystander, mut bystander_rx) = logged_in_session(1, &engine, &publisher, &sessions);
    // never subscribes
    let _ = &mut bystander;

    let (mut trader, _trader_rx) = logged_in_session(2, &engine, &publisher, &sessions);
    assert_eq!(
        trader.feed(&new_order_frame(1, 1, "AAPL", Side::Buy, 50.0, 10)).unwrap(),
        Action::Continue
    );

    assert!(bystander_rx.try_recv().is_err(), "a session that never subscribed must get nothing");
}

#[test]
fn disconnect_cleanup_drops_subscriptions_but_never_cancels_resting_orders() {
    let engine = Arc::new(Engine::new());
    let sessions = Arc::new(SessionRegistry::new());
    let publisher = Arc::new(Publisher::new(Arc::clone(&sessions), 5));

    let (mut trader, _trader_rx) = logged_in_session(1, &engine, &publisher, &sessions);
    let resting_id = {
        let outcome = engine.submit(
            1,
            matching_engine::engine::NewOrderRequest {
                client_order_id: 1,
                symbol: sym("AAPL"),
                side: Side::Buy,
                kind: matching_engine::wire::OrderKind::Limit,
                price: 50.0,
                quantity: 10,
            },
        );
        outcome.engine_order_id.expect("resting order must be accepted")
    };
    assert_eq!(trader.feed(&subscribe_frame(2, "AAPL", true)).unwrap(), Action::Continue);

    // Simulate the acceptor's disconnect cleanup (`net::acceptor::handle_connection`'s
    // tail) without tearing down a real socket.
    sessions.unregister(1);
    publisher.unsubscribe_all(1);

    let (bids, _) = engine.with_book(sym("AAPL"), |b| b.depth(5));
    assert_eq!(bids, vec![(50.0, 10)], "disconnect must not cancel a resting order");

    // The disconnected session's subscription is gone: a later mutation
    // from a different session must not try to deliver to it (it would
    // simply be dropped by `SessionRegistry::send`, but unsubscribe_all
    // also means it's no longer even attempted).
    let (mut other, _other_rx) = logged_in_session(2, &engine, &publisher, &sessions);
    assert_eq!(
        other.feed(&new_order_frame(1, 2, "AAPL", Side::Sell, 50.0, 5)).unwrap(),
        Action::Continue
    );

    match engine.cancel(1, resting_id, sym("AAPL"), Side::Buy) {
        matching_engine::engine::CancelOutcome::Cancelled(_) => {}
        matching_engine::engine::CancelOutcome::NotFound(_) => {
            panic!("resting order should still be live after disconnect, minus what the second order just filled")
        }
    }
}
