//! The session registry: tracks every live player session.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Allocating a plate when a connection opens
//! - Mapping connections to plates and plates to session handles
//! - Recording which sessions announced themselves as admins
//! - Producing snapshots of the handles to broadcast to
//!
//! # Concurrency note
//!
//! Unlike a single-task manager, the registry is shared by every
//! connection task, so all three maps are `DashMap`s. Snapshots clone
//! handles out of the map; no shard lock is held while frames are queued.

use cabforge_protocol::{PlayerId, Role};
use cabforge_transport::ConnectionId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::plate::generate_plate;
use crate::{SessionConfig, SessionError, SessionHandle};

/// Registry of all live sessions.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ [live] ── set_role() ──→ [live, admin]
///                  │                          │
///                  ▼                          ▼
///              unregister()              unregister()
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Outbound handles, keyed by plate.
    handles: DashMap<PlayerId, SessionHandle>,

    /// Which plate each transport connection was given.
    connections: DashMap<ConnectionId, PlayerId>,

    /// Announced roles. A missing entry means [`Role::User`].
    roles: DashMap<PlayerId, Role>,

    config: SessionConfig,
}

impl SessionRegistry {
    /// Creates a new, empty registry with the given config.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            handles: DashMap::new(),
            connections: DashMap::new(),
            roles: DashMap::new(),
            config,
        }
    }

    /// Allocates a plate for a new connection and stores its handle.
    ///
    /// With the default config a colliding plate replaces the session
    /// already registered under it. With `plate_attempts > 1` the registry
    /// draws again on collision and only replaces on the last attempt.
    pub fn register(&self, connection_id: ConnectionId, handle: SessionHandle) -> PlayerId {
        self.register_with(connection_id, handle, |_, _| {})
    }

    /// Like [`register`](Self::register), but runs `greet` with the new
    /// plate before the handle becomes visible to other sessions.
    ///
    /// Frames queued by `greet` are therefore the first the connection
    /// receives; no concurrent broadcast can get ahead of them.
    ///
    /// `greet` runs while the plate's shard is locked and must not call
    /// back into the registry's handle map (`handle`, `sessions`, ...).
    pub fn register_with(
        &self,
        connection_id: ConnectionId,
        handle: SessionHandle,
        greet: impl FnOnce(&PlayerId, &SessionHandle),
    ) -> PlayerId {
        let mut attempts_left = self.config.plate_attempts.max(1);

        let player_id = loop {
            attempts_left -= 1;
            match self.handles.entry(generate_plate()) {
                Entry::Vacant(slot) => {
                    let player_id = slot.key().clone();
                    greet(&player_id, &handle);
                    slot.insert(handle);
                    break player_id;
                }
                Entry::Occupied(mut slot) if attempts_left == 0 => {
                    let player_id = slot.key().clone();
                    tracing::warn!(%player_id, %connection_id, "plate collision, replacing session");
                    greet(&player_id, &handle);
                    slot.insert(handle);
                    break player_id;
                }
                Entry::Occupied(slot) => {
                    tracing::debug!(player_id = %slot.key(), "plate collision, drawing again");
                }
            }
        };

        self.connections.insert(connection_id, player_id.clone());
        tracing::info!(%player_id, %connection_id, "session registered");
        player_id
    }

    /// Removes a connection's session and role.
    ///
    /// Returns the plate it was registered under, or `None` if the
    /// connection is unknown (so a second call is a no-op).
    pub fn unregister(&self, connection_id: ConnectionId) -> Option<PlayerId> {
        let (_, player_id) = self.connections.remove(&connection_id)?;

        // A collision may have handed the plate to a newer connection.
        self.handles
            .remove_if(&player_id, |_, handle| handle.connection_id() == connection_id);
        self.roles.remove(&player_id);

        tracing::info!(%player_id, %connection_id, "session unregistered");
        Some(player_id)
    }

    /// Looks up the plate assigned to a connection.
    pub fn resolve(&self, connection_id: ConnectionId) -> Option<PlayerId> {
        self.connections
            .get(&connection_id)
            .map(|entry| entry.value().clone())
    }

    /// Like [`resolve`](Self::resolve), but an unknown connection is an
    /// error.
    pub fn require(&self, connection_id: ConnectionId) -> Result<PlayerId, SessionError> {
        self.resolve(connection_id)
            .ok_or(SessionError::NotFound(connection_id))
    }

    /// Records a role announcement. Later announcements overwrite.
    pub fn set_role(&self, player_id: &PlayerId, role: Role) {
        tracing::debug!(%player_id, ?role, "role set");
        self.roles.insert(player_id.clone(), role);
    }

    /// The player's role, [`Role::User`] if never announced.
    pub fn role(&self, player_id: &PlayerId) -> Role {
        self.roles
            .get(player_id)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    pub fn is_admin(&self, player_id: &PlayerId) -> bool {
        self.role(player_id).is_admin()
    }

    /// A clone of the handle registered under `player_id`.
    pub fn handle(&self, player_id: &PlayerId) -> Option<SessionHandle> {
        self.handles.get(player_id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every live handle.
    pub fn sessions(&self) -> Vec<SessionHandle> {
        self.handles
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Snapshot of the handles whose player announced `admin`.
    pub fn admin_sessions(&self) -> Vec<SessionHandle> {
        self.roles
            .iter()
            .filter(|entry| entry.value().is_admin())
            .filter_map(|entry| self.handle(entry.key()))
            .collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::plate::is_plate;
    use crate::session::FrameReceiver;

    fn handle(id: u64) -> (SessionHandle, FrameReceiver) {
        SessionHandle::channel(ConnectionId::new(id))
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(SessionConfig::default())
    }

    // --- register ---

    #[test]
    fn test_register_returns_plate_and_maps_connection() {
        let registry = registry();
        let (h, _rx) = handle(1);

        let player_id = registry.register(ConnectionId::new(1), h);

        assert!(is_plate(player_id.as_str()));
        assert_eq!(registry.resolve(ConnectionId::new(1)), Some(player_id.clone()));
        assert!(registry.handle(&player_id).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_multiple_connections_each_resolves() {
        let registry = SessionRegistry::new(SessionConfig { plate_attempts: 8 });
        let mut receivers = Vec::new();
        let mut plates = Vec::new();

        for id in 1..=5 {
            let (h, rx) = handle(id);
            receivers.push(rx);
            plates.push(registry.register(ConnectionId::new(id), h));
        }

        assert_eq!(registry.len(), 5);
        for (index, plate) in plates.iter().enumerate() {
            let connection = ConnectionId::new(index as u64 + 1);
            assert_eq!(registry.resolve(connection).as_ref(), Some(plate));
        }
    }

    #[test]
    fn test_register_with_greets_before_handle_is_visible() {
        let registry = registry();
        let (h, mut rx) = handle(1);

        let player_id = registry.register_with(ConnectionId::new(1), h, |plate, handle| {
            assert!(registry.resolve(ConnectionId::new(1)).is_none(), "mapped too early");
            handle.send(Arc::from(plate.as_str())).unwrap();
        });

        assert_eq!(&*rx.try_recv().unwrap(), player_id.as_str());
        assert_eq!(registry.sessions().len(), 1);
    }

    #[test]
    fn test_register_new_player_defaults_to_user() {
        let registry = registry();
        let (h, _rx) = handle(1);
        let player_id = registry.register(ConnectionId::new(1), h);

        assert_eq!(registry.role(&player_id), Role::User);
        assert!(!registry.is_admin(&player_id));
    }

    // --- unregister ---

    #[test]
    fn test_unregister_removes_handle_mapping_and_role() {
        let registry = registry();
        let (h, _rx) = handle(1);
        let player_id = registry.register(ConnectionId::new(1), h);
        registry.set_role(&player_id, Role::Admin);

        let removed = registry.unregister(ConnectionId::new(1));

        assert_eq!(removed, Some(player_id.clone()));
        assert!(registry.resolve(ConnectionId::new(1)).is_none());
        assert!(registry.handle(&player_id).is_none());
        assert_eq!(registry.role(&player_id), Role::User);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_twice_returns_none() {
        let registry = registry();
        let (h, _rx) = handle(1);
        registry.register(ConnectionId::new(1), h);

        assert!(registry.unregister(ConnectionId::new(1)).is_some());
        assert!(registry.unregister(ConnectionId::new(1)).is_none());
    }

    #[test]
    fn test_require_after_unregister_is_not_found() {
        let registry = registry();
        let (h, _rx) = handle(1);
        let player_id = registry.register(ConnectionId::new(1), h);
        assert_eq!(registry.require(ConnectionId::new(1)).unwrap(), player_id);

        registry.unregister(ConnectionId::new(1));

        assert!(matches!(
            registry.require(ConnectionId::new(1)),
            Err(SessionError::NotFound(id)) if id == ConnectionId::new(1)
        ));
    }

    #[test]
    fn test_unregister_unknown_connection_returns_none() {
        let registry = registry();
        assert!(registry.unregister(ConnectionId::new(42)).is_none());
    }

    #[test]
    fn test_unregister_keeps_handle_taken_over_by_other_connection() {
        let registry = registry();
        let (first, _rx1) = handle(1);
        let (second, _rx2) = handle(2);
        let player_id = registry.register(ConnectionId::new(1), first);

        // Simulate a collision that handed the plate to connection 2.
        registry.handles.insert(player_id.clone(), second);
        registry
            .connections
            .insert(ConnectionId::new(2), player_id.clone());

        registry.unregister(ConnectionId::new(1));

        let survivor = registry.handle(&player_id).expect("handle kept");
        assert_eq!(survivor.connection_id(), ConnectionId::new(2));
    }

    // --- roles ---

    #[test]
    fn test_set_role_later_announcement_overwrites() {
        let registry = registry();
        let (h, _rx) = handle(1);
        let player_id = registry.register(ConnectionId::new(1), h);

        registry.set_role(&player_id, Role::Admin);
        assert!(registry.is_admin(&player_id));

        registry.set_role(&player_id, Role::User);
        assert!(!registry.is_admin(&player_id));
    }

    #[test]
    fn test_admin_sessions_only_returns_admins() {
        let registry = registry();
        let (admin, _rx1) = handle(1);
        let (user, _rx2) = handle(2);
        let admin_id = registry.register(ConnectionId::new(1), admin);
        registry.register(ConnectionId::new(2), user);
        registry.set_role(&admin_id, Role::Admin);

        let admins = registry.admin_sessions();

        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].connection_id(), ConnectionId::new(1));
        assert_eq!(registry.sessions().len(), 2);
    }

    #[test]
    fn test_sessions_snapshot_can_send_after_registry_changes() {
        let registry = registry();
        let (h, mut rx) = handle(1);
        registry.register(ConnectionId::new(1), h);

        let snapshot = registry.sessions();
        registry.unregister(ConnectionId::new(1));

        // The snapshot still owns a sender; the frame is queued.
        snapshot[0].send(Arc::from("hello")).unwrap();
        assert_eq!(&*rx.try_recv().unwrap(), "hello");
    }

    #[test]
    fn test_register_concurrent_connections_all_resolve() {
        let registry = SessionRegistry::new(SessionConfig { plate_attempts: 8 });

        std::thread::scope(|scope| {
            for id in 1..=16 {
                let registry = &registry;
                scope.spawn(move || {
                    let (h, rx) = handle(id);
                    let player_id = registry.register(ConnectionId::new(id), h);
                    assert_eq!(registry.resolve(ConnectionId::new(id)), Some(player_id));
                    // The receiver drops here; the handle stays registered.
                    drop(rx);
                });
            }
        });

        assert_eq!(registry.len(), 16);
    }
}
