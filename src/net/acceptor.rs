//! C2/C5 glue: the TCP accept loop and per-connection reader/writer
//! tasks. Kept deliberately thin — all protocol logic lives in
//! [`crate::session::Session`]; this module only owns sockets and task
//! lifetimes.

use crate::engine::Engine;
use crate::marketdata::Publisher;
use crate::session::{Action, Session, SessionRegistry};
use crate::wire::encode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{info, warn};

const READ_BUF_SIZE: usize = 8192;

/// Accepts connections on `listener` until the process is torn down,
/// spawning one reader task and one writer task per connection. Never
/// returns under normal operation.
pub async fn run(
    listener: TcpListener,
    engine: Arc<Engine>,
    publisher: Arc<Publisher>,
    sessions: Arc<SessionRegistry>,
    max_frame_bytes: usize,
) {
    let next_session_id = Arc::new(AtomicU64::new(1));
    loop {
        let (socket, peer_addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let session_id = next_session_id.fetch_add(1, Ordering::Relaxed);
        info!(session_id, %peer_addr, "connection accepted");

        let engine = Arc::clone(&engine);
        let publisher = Arc::clone(&publisher);
        let sessions = Arc::clone(&sessions);
        tokio::spawn(async move {
            handle_connection(session_id, socket, engine, publisher, sessions, max_frame_bytes).await;
        });
    }
}

async fn handle_connection(
    session_id: u64,
    socket: TcpStream,
    engine: Arc<Engine>,
    publisher: Arc<Publisher>,
    sessions: Arc<SessionRegistry>,
    max_frame_bytes: usize,
) {
    let (mut reader, mut writer) = socket.into_split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    sessions.register(session_id, outbound_tx);

    let writer_task = tokio::spawn(async move {
        let mut seq_num: u16 = 0;
        let mut buf = Vec::new();
        while let Some(msg) = outbound_rx.recv().await {
            buf.clear();
            encode(&msg, seq_num, &mut buf);
            seq_num = seq_num.wrapping_add(1);
            if writer.write_all(&buf).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new(
        session_id,
        max_frame_bytes,
        Arc::clone(&engine),
        Arc::clone(&publisher),
        Arc::clone(&sessions),
    );
    let mut read_buf = vec![0u8; READ_BUF_SIZE];

    loop {
        let n = match reader.read(&mut read_buf).await {
            Ok(0) => {
                info!(session_id, "connection closed by peer");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                warn!(session_id, error = %e, "read error");
                break;
            }
        };
        match session.feed(&read_buf[..n]) {
            Ok(Action::Continue) => continue,
            Ok(Action::Close) => {
                info!(session_id, "session closed after login rejection");
                break;
            }
            Err(e) => {
                warn!(session_id, error = %e, "session closed on protocol error");
                break;
            }
        }
    }

    // §5: a disconnect cancels subscriptions but never resting orders —
    // those stay on the book until explicitly cancelled or matched.
    sessions.unregister(session_id);
    publisher.unsubscribe_all(session_id);
    writer_task.abort();
}
