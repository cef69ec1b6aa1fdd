//! Error types for the session layer.

use cabforge_transport::ConnectionId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No player is mapped to this connection. Either it never
    /// connected or it already disconnected.
    #[error("no session for connection {0}")]
    NotFound(ConnectionId),

    /// The session's writer side is gone, so the frame was not queued.
    /// Happens when a broadcast races a disconnect.
    #[error("session for connection {0} is closed")]
    Closed(ConnectionId),
}
