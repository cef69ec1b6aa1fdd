//! Unified error type for the Cabforge server.

use cabforge_protocol::ProtocolError;
use cabforge_session::SessionError;
use cabforge_transport::TransportError;
use cabforge_world::WorldError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CabforgeError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (malformed frame, wrong field type).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown connection, closed handle).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A world-level error (unknown player or person).
    #[error(transparent)]
    World(#[from] WorldError),
}
