//! Per-connection handler: greeting, frame loop, and teardown.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Create the session channel and register with the engine
//!   2. Spawn a writer task draining the channel into the socket
//!   3. Loop: receive text frames → `GameEngine::on_message`, one at a time.
//!      A binary frame that isn't UTF-8 → `GameEngine::reject_frame`
//!   4. On exit (close, error or panic) the guard disconnects the session

use std::sync::Arc;

use cabforge_session::{FrameReceiver, SessionHandle};
use cabforge_transport::{Connection, ConnectionId, TransportError, WebSocketConnection};

use crate::CabforgeError;
use crate::engine::GameEngine;

/// Drop guard that disconnects a connection's session when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Engine calls
/// are synchronous, so the guard can run the disconnect inline.
struct DisconnectGuard {
    connection_id: ConnectionId,
    engine: Arc<GameEngine>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.engine.on_disconnect(self.connection_id);
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    engine: Arc<GameEngine>,
) -> Result<(), CabforgeError> {
    let conn = Arc::new(conn);
    let connection_id = conn.id();
    tracing::debug!(%connection_id, "handling new connection");

    // Register and arm the guard back to back, so every registered
    // session gets torn down.
    let (handle, frames) = SessionHandle::channel(connection_id);
    let player_id = engine.on_connect(connection_id, handle);
    let _guard = DisconnectGuard {
        connection_id,
        engine: Arc::clone(&engine),
    };

    tokio::spawn(write_frames(Arc::clone(&conn), frames));

    loop {
        match conn.recv_text().await {
            Ok(Some(text)) => engine.on_message(connection_id, &text)?,
            Err(TransportError::InvalidUtf8(e)) => {
                tracing::debug!(%player_id, error = %e, "non-UTF-8 frame");
                engine.reject_frame(connection_id)?;
            }
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return Err(e.into());
            }
        }
    }

    // _guard drops here → session disconnect fires.
    Ok(())
}

/// Drains a session's outbound queue into the socket.
///
/// Ends when the session is unregistered (the queue's senders are gone)
/// or when the socket stops accepting writes.
async fn write_frames(conn: Arc<WebSocketConnection>, mut frames: FrameReceiver) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = conn.send_text(&frame).await {
            tracing::warn!(connection_id = %conn.id(), error = %e, "send failed, stopping writer");
            return;
        }
    }
    tracing::debug!(connection_id = %conn.id(), "writer finished");
}
