//! C2: per-connection framing, login handshake, and dispatch into the
//! engine and the market-data publisher.

use super::error::SessionError;
use crate::engine::{CancelOutcome, Engine, NewOrderRequest};
use crate::marketdata::Publisher;
use crate::wire::{ClientMessage, DecodeOutcome, ServerMessage, decode_one};
use std::sync::Arc;
use tracing::{info, warn};

/// §4.2's three-state session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Closed,
}

/// What the caller (the reader task in the acceptor) should do after a
/// call into [`Session::feed`] or [`Session::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Close,
}

/// Owns one connection's state: the unauthenticated/authenticated/closed
/// machine, the inbound byte buffer, and the glue that turns a decoded
/// [`ClientMessage`] into engine and publisher calls. Replies addressed
/// to this session are sent directly on `outbound`; replies addressed to
/// a counterparty (the owner of a resting order this session just
/// crossed) go through the shared session registry inside `engine`'s
/// caller — see [`crate::session::SessionRegistry`].
pub struct Session {
    pub id: u64,
    state: SessionState,
    inbound: Vec<u8>,
    max_frame_bytes: usize,
    engine: Arc<Engine>,
    publisher: Arc<Publisher>,
    sessions: Arc<super::SessionRegistry>,
}

impl Session {
    pub fn new(
        id: u64,
        max_frame_bytes: usize,
        engine: Arc<Engine>,
        publisher: Arc<Publisher>,
        sessions: Arc<super::SessionRegistry>,
    ) -> Self {
        Session {
            id,
            state: SessionState::Unauthenticated,
            inbound: Vec::new(),
            max_frame_bytes,
            engine,
            publisher,
            sessions,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Appends newly-read bytes to the inbound buffer and processes every
    /// complete frame now available. Returns `Action::Close` as soon as a
    /// frame fails to decode or violates the session's current state;
    /// the caller must not call `feed` again afterward.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Action, SessionError> {
        self.inbound.extend_from_slice(bytes);
        loop {
            match decode_one(&self.inbound, self.max_frame_bytes) {
                DecodeOutcome::NeedMore => return Ok(Action::Continue),
                DecodeOutcome::Error(e) => {
                    self.state = SessionState::Closed;
                    return Err(SessionError::Codec(e));
                }
                DecodeOutcome::UnknownType { msg_type, consumed, .. } => {
                    self.inbound.drain(..consumed);
                    match self.dispatch_unknown_type(msg_type) {
                        Action::Continue => continue,
                        Action::Close => {
                            self.state = SessionState::Closed;
                            return Ok(Action::Close);
                        }
                    }
                }
                DecodeOutcome::Message { message, consumed, .. } => {
                    self.inbound.drain(..consumed);
                    match self.dispatch(message) {
                        Ok(Action::Continue) => continue,
                        Ok(Action::Close) => {
                            self.state = SessionState::Closed;
                            return Ok(Action::Close);
                        }
                        Err(e) => {
                            self.state = SessionState::Closed;
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// §4.2: an unrecognized `msg_type` is only fatal before login — once
    /// authenticated it is logged and ignored, not treated as a protocol
    /// violation.
    fn dispatch_unknown_type(&mut self, msg_type: u8) -> Action {
        if self.state == SessionState::Unauthenticated {
            warn!(session_id = self.id, msg_type, "protocol violation: unknown message type before login");
            self.reply(ServerMessage::LoginResponse {
                ok: false,
                message: "login required".to_string(),
            });
            Action::Close
        } else {
            warn!(session_id = self.id, msg_type, "ignoring unknown message type");
            Action::Continue
        }
    }

    fn reply(&self, msg: ServerMessage) {
        self.sessions.send(self.id, msg);
    }

    fn dispatch(&mut self, message: ClientMessage) -> Result<Action, SessionError> {
        if self.state == SessionState::Unauthenticated {
            return self.dispatch_unauthenticated(message);
        }
        self.dispatch_authenticated(message)
    }

    fn dispatch_unauthenticated(&mut self, message: ClientMessage) -> Result<Action, SessionError> {
        match message {
            ClientMessage::Login { user, password } => {
                let ok = !is_all_zero(&user) && !is_all_zero(&password);
                if ok {
                    self.state = SessionState::Authenticated;
                    info!(session_id = self.id, "session authenticated");
                    self.reply(ServerMessage::LoginResponse {
                        ok: true,
                        message: "welcome".to_string(),
                    });
                    Ok(Action::Continue)
                } else {
                    warn!(session_id = self.id, "login rejected: empty credentials");
                    self.reply(ServerMessage::LoginResponse {
                        ok: false,
                        message: "empty credentials".to_string(),
                    });
                    Ok(Action::Close)
                }
            }
            _ => {
                warn!(session_id = self.id, "protocol violation: first frame must be a login");
                self.reply(ServerMessage::LoginResponse {
                    ok: false,
                    message: "login required".to_string(),
                });
                Ok(Action::Close)
            }
        }
    }

    fn dispatch_authenticated(&mut self, message: ClientMessage) -> Result<Action, SessionError> {
        match message {
            ClientMessage::Login { .. } => Err(SessionError::ProtocolViolation {
                reason: "already authenticated",
            }),
            ClientMessage::NewOrder {
                client_order_id,
                symbol,
                side,
                kind,
                price,
                quantity,
            } => {
                let outcome = self.engine.submit(
                    self.id,
                    NewOrderRequest {
                        client_order_id,
                        symbol,
                        side,
                        kind,
                        price,
                        quantity,
                    },
                );
                for exec in &outcome.executions {
                    self.sessions
                        .send(exec.session_id, ServerMessage::ExecReport(exec.to_exec_report()));
                }
                for trade in &outcome.trades {
                    self.publisher.publish_ticker(trade);
                }
                if outcome.engine_order_id.is_some() {
                    self.publisher.publish_mutation(&self.engine, symbol);
                }
                Ok(Action::Continue)
            }
            ClientMessage::Cancel {
                engine_order_id,
                symbol,
                side,
            } => {
                match self.engine.cancel(self.id, engine_order_id, symbol, side) {
                    CancelOutcome::Cancelled(exec) => {
                        self.sessions
                            .send(exec.session_id, ServerMessage::ExecReport(exec.to_exec_report()));
                        self.publisher.publish_mutation(&self.engine, symbol);
                    }
                    CancelOutcome::NotFound(exec) => {
                        self.sessions
                            .send(exec.session_id, ServerMessage::ExecReport(exec.to_exec_report()));
                    }
                }
                Ok(Action::Continue)
            }
            ClientMessage::MarketDataQuery { symbol } => {
                self.publisher.pull_snapshot(&self.engine, symbol, self.id);
                Ok(Action::Continue)
            }
            ClientMessage::Subscribe { symbol, subscribe } => {
                if subscribe {
                    self.publisher.subscribe(&self.engine, symbol, self.id);
                } else {
                    self.publisher.unsubscribe(symbol, self.id);
                }
                Ok(Action::Continue)
            }
        }
    }
}

fn is_all_zero(field: &[u8]) -> bool {
    field.iter().all(|&b| b == 0)
}
