//! Maps live session ids to their outbound channel, so the engine and the
//! market-data publisher can deliver a message to any session — not just
//! the one that triggered the mutation (a resting order's owner learns
//! about a fill from whichever aggressor crossed it).

use crate::wire::ServerMessage;
use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

pub struct SessionRegistry {
    senders: DashMap<u64, UnboundedSender<ServerMessage>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            senders: DashMap::new(),
        }
    }

    pub fn register(&self, session_id: u64, sender: UnboundedSender<ServerMessage>) {
        self.senders.insert(session_id, sender);
    }

    pub fn unregister(&self, session_id: u64) {
        self.senders.remove(&session_id);
    }

    /// Best-effort delivery: a session that has already disconnected
    /// simply drops the message, same as a closed socket would.
    pub fn send(&self, session_id: u64, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&session_id) {
            if sender.send(msg).is_err() {
                trace!(session_id, "dropped message for session with closed outbound channel");
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
