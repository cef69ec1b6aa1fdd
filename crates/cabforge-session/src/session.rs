//! Session types: the server's handle on one live connection.
//!
//! A session doesn't own the socket. It owns the sending half of an
//! unbounded channel; a writer task on the connection side drains the
//! other half into the transport. That keeps every send from the engine
//! a non-blocking push and preserves per-connection FIFO order.

use std::sync::Arc;

use cabforge_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::SessionError;

/// One serialized outbound frame. Shared between recipients of a
/// broadcast, so the JSON is built once.
pub type Frame = Arc<str>;

/// Receiving half of a session channel, drained by the writer task.
pub type FrameReceiver = mpsc::UnboundedReceiver<Frame>;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How many plates to draw before accepting a colliding one.
    ///
    /// Default: 1, i.e. no collision check. A colliding plate then
    /// replaces the live session registered under it. Raise this to
    /// retry on collision; the plate format stays the same either way.
    pub plate_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { plate_attempts: 1 }
    }
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// The live handle for one connection.
///
/// Cheap to clone: it's a connection id and an `mpsc` sender. Broadcasts
/// clone handles out of the registry so no map lock is held while
/// frames are queued.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    connection_id: ConnectionId,
    sender: mpsc::UnboundedSender<Frame>,
}

impl SessionHandle {
    /// Creates a handle and the receiver its writer task should drain.
    pub fn channel(connection_id: ConnectionId) -> (Self, FrameReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                connection_id,
                sender,
            },
            receiver,
        )
    }

    /// The transport connection this session belongs to.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// `false` once the writer side has gone away.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues one frame for delivery. Never blocks.
    ///
    /// # Errors
    /// Returns [`SessionError::Closed`] if the writer side is gone.
    pub fn send(&self, frame: Frame) -> Result<(), SessionError> {
        self.sender
            .send(frame)
            .map_err(|_| SessionError::Closed(self.connection_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_queues_frames_in_order() {
        let (handle, mut rx) = SessionHandle::channel(ConnectionId::new(1));

        handle.send(Arc::from("first")).unwrap();
        handle.send(Arc::from("second")).unwrap();

        assert_eq!(&*rx.try_recv().unwrap(), "first");
        assert_eq!(&*rx.try_recv().unwrap(), "second");
    }

    #[test]
    fn test_send_after_receiver_dropped_returns_closed() {
        let (handle, rx) = SessionHandle::channel(ConnectionId::new(9));
        assert!(handle.is_open());

        drop(rx);

        assert!(!handle.is_open());
        let result = handle.send(Arc::from("late"));
        assert!(
            matches!(result, Err(SessionError::Closed(id)) if id == ConnectionId::new(9))
        );
    }

    #[test]
    fn test_default_config_does_not_retry() {
        assert_eq!(SessionConfig::default().plate_attempts, 1);
    }
}
