//! Fan-out of server frames to sessions.

use std::sync::Arc;

use cabforge_protocol::{Codec, JsonCodec};
use cabforge_session::{Frame, SessionHandle, SessionRegistry};
use serde::Serialize;

/// Which sessions a broadcast goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every registered session.
    All,
    /// Sessions whose player announced the `admin` role.
    Admins,
}

/// Encodes payloads once and queues them on each recipient's handle.
///
/// Delivery never fails from the caller's point of view: a closed or
/// failing session is logged and skipped, the rest still get the frame.
#[derive(Debug)]
pub struct Broadcaster {
    sessions: Arc<SessionRegistry>,
    codec: JsonCodec,
}

impl Broadcaster {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self {
            sessions,
            codec: JsonCodec,
        }
    }

    /// Sends `payload` to every session in `audience`.
    ///
    /// Returns how many sessions the frame was queued for.
    pub fn broadcast<T: Serialize>(&self, audience: Audience, payload: &T) -> usize {
        let Some(frame) = self.encode(payload) else {
            return 0;
        };
        let recipients = match audience {
            Audience::All => self.sessions.sessions(),
            Audience::Admins => self.sessions.admin_sessions(),
        };
        let mut delivered = 0;
        for handle in &recipients {
            if deliver(handle, &frame) {
                delivered += 1;
            }
        }
        tracing::debug!(?audience, delivered, recipients = recipients.len(), "broadcast");
        delivered
    }

    /// Sends `payload` to one session.
    pub fn unicast<T: Serialize>(&self, handle: &SessionHandle, payload: &T) -> bool {
        match self.encode(payload) {
            Some(frame) => deliver(handle, &frame),
            None => false,
        }
    }

    fn encode<T: Serialize>(&self, payload: &T) -> Option<Frame> {
        match self.codec.encode_text(payload) {
            Ok(text) => Some(Arc::from(text)),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode outbound frame");
                None
            }
        }
    }
}

fn deliver(handle: &SessionHandle, frame: &Frame) -> bool {
    if !handle.is_open() {
        return false;
    }
    match handle.send(Arc::clone(frame)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(connection_id = %handle.connection_id(), error = %e, "send failed");
            false
        }
    }
}
