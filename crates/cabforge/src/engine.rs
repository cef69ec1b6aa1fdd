//! The game engine: connection lifecycle over the shared world.
//!
//! `GameEngine` composes the session registry, the player directory and
//! the collectible registry. Every method is synchronous and takes
//! `&self`: state lives in concurrent maps and sends are channel pushes,
//! so connection tasks share one `Arc<GameEngine>` without a global lock.
//!
//! Inbound frame handling lives in [`router`](crate::router).

use std::sync::Arc;

use cabforge_protocol::{PlayerId, ServerMessage};
use cabforge_session::{SessionConfig, SessionHandle, SessionRegistry};
use cabforge_transport::ConnectionId;
use cabforge_world::{CollectibleRegistry, PlayerDirectory, WorldConfig};

use crate::broadcast::{Audience, Broadcaster};

/// Shared state and behavior for every connection.
#[derive(Debug)]
pub struct GameEngine {
    pub(crate) sessions: Arc<SessionRegistry>,
    pub(crate) players: PlayerDirectory,
    pub(crate) persons: CollectibleRegistry,
    pub(crate) broadcaster: Broadcaster,
}

impl GameEngine {
    pub fn new(session_config: SessionConfig, world_config: WorldConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new(session_config));
        Self {
            broadcaster: Broadcaster::new(Arc::clone(&sessions)),
            sessions,
            players: PlayerDirectory::new(world_config.spawn),
            persons: CollectibleRegistry::new(world_config.catalog),
        }
    }

    /// Registers a new connection and greets it.
    ///
    /// The connection's first two frames are its `PLAYER_ID` and then the
    /// collectible catalog. Both are queued before the session becomes
    /// visible to broadcasts, so nothing can land between them. After that
    /// every session (the new one included) gets the catalog again and the
    /// player-state snapshot. No player is created yet; that waits for the
    /// first game frame.
    pub fn on_connect(&self, connection_id: ConnectionId, handle: SessionHandle) -> PlayerId {
        self.persons.ensure_seeded();
        let player_id = self
            .sessions
            .register_with(connection_id, handle, |player_id, handle| {
                let assign = ServerMessage::AssignId {
                    player_id: player_id.clone(),
                };
                self.broadcaster.unicast(handle, &assign);
                self.broadcaster.unicast(handle, &self.catalog());
            });
        tracing::info!(%connection_id, %player_id, "player connected");

        self.broadcast_catalog();
        self.broadcaster
            .broadcast(Audience::All, &self.players.states());

        player_id
    }

    /// Tears down a connection's session and player, then tells everyone
    /// else.
    ///
    /// Returns the plate that left, or `None` for an unknown or already
    /// disconnected connection (so calling it twice is harmless).
    pub fn on_disconnect(&self, connection_id: ConnectionId) -> Option<PlayerId> {
        let Some(player_id) = self.sessions.unregister(connection_id) else {
            tracing::debug!(%connection_id, "disconnect for unknown connection");
            return None;
        };
        self.players.remove(&player_id);
        tracing::info!(%connection_id, %player_id, "player disconnected");

        self.broadcaster
            .broadcast(Audience::All, &self.players.states());
        Some(player_id)
    }

    /// The plate assigned to a live connection.
    pub fn resolve_player_id(&self, connection_id: ConnectionId) -> Option<PlayerId> {
        self.sessions.resolve(connection_id)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.players
    }

    pub fn persons(&self) -> &CollectibleRegistry {
        &self.persons
    }

    fn catalog(&self) -> ServerMessage {
        ServerMessage::AvailablePersons {
            persons: self.persons.catalog(),
        }
    }

    pub(crate) fn broadcast_catalog(&self) {
        self.broadcaster.broadcast(Audience::All, &self.catalog());
    }

    pub(crate) fn broadcast_roster(&self) {
        self.broadcaster
            .broadcast(Audience::Admins, &self.roster());
    }

    pub(crate) fn roster(&self) -> ServerMessage {
        let players = self.players.roster();
        ServerMessage::PlayersInfo {
            count: players.len(),
            players,
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(SessionConfig::default(), WorldConfig::default())
    }
}
