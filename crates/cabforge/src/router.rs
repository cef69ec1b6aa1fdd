//! Inbound frame dispatch.
//!
//! Classification is done by [`Inbound::parse`]; this module applies the
//! result to the world and decides who hears about it. Any failure is
//! answered with an `error` frame to the sender only.

use cabforge_protocol::{Action, Inbound, PlayerId, PositionUpdate, Role, ServerMessage};
use cabforge_session::SessionError;
use cabforge_transport::ConnectionId;
use cabforge_world::Toggle;

use crate::CabforgeError;
use crate::broadcast::Audience;
use crate::engine::GameEngine;

/// Text of the `error` frame sent back for a frame that couldn't be
/// processed. Clients match on it.
pub const PROCESSING_ERROR: &str = "Error processing message";

impl GameEngine {
    /// Handles one text frame from a connection.
    ///
    /// Frames the sender got wrong are logged and answered with an `error`
    /// frame; they are not errors of this call.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the connection is not registered
    /// (never connected, or already disconnected). Nothing is applied.
    pub fn on_message(&self, connection_id: ConnectionId, text: &str) -> Result<(), SessionError> {
        let player_id = self.sessions.require(connection_id)?;
        tracing::debug!(%player_id, len = text.len(), "frame received");

        if let Err(e) = self.dispatch(&player_id, text) {
            tracing::warn!(%player_id, error = %e, "failed to process frame");
            self.reply_error(&player_id, PROCESSING_ERROR);
        }
        Ok(())
    }

    /// Answers a frame the transport could not read as text (a binary
    /// frame that is not UTF-8). Nothing is applied.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the connection is not registered.
    pub fn reject_frame(&self, connection_id: ConnectionId) -> Result<(), SessionError> {
        let player_id = self.sessions.require(connection_id)?;
        tracing::warn!(%player_id, "unreadable frame rejected");
        self.reply_error(&player_id, PROCESSING_ERROR);
        Ok(())
    }

    fn dispatch(&self, player_id: &PlayerId, text: &str) -> Result<(), CabforgeError> {
        match Inbound::parse(text)? {
            Inbound::Role(role) => self.announce_role(player_id, role),
            Inbound::Game { name, action } => {
                // The name only counts on the frame that creates the player.
                if !self.players.contains(player_id) {
                    let name = name.as_ref().map(Inbound::display_name).transpose()?;
                    if self.players.ensure(player_id, name) {
                        self.broadcast_roster();
                    }
                }
                match action {
                    Action::TogglePerson { person_id, active } => {
                        self.toggle_person(&person_id, active);
                    }
                    Action::CollectPerson { person_id } => {
                        self.collect_person(player_id, &person_id);
                    }
                    Action::SetCarrying { target, has_person } => {
                        self.set_carrying(&target, has_person);
                    }
                    Action::Move(update) => self.move_player(player_id, &update),
                }
            }
        }
        Ok(())
    }

    fn announce_role(&self, player_id: &PlayerId, role: Role) {
        self.sessions.set_role(player_id, role);
        if !role.is_admin() {
            return;
        }
        tracing::info!(%player_id, "admin connected");
        if let Some(handle) = self.sessions.handle(player_id) {
            self.broadcaster.unicast(&handle, &self.roster());
        }
    }

    fn toggle_person(&self, person_id: &str, active: bool) {
        match self.persons.toggle(person_id, active) {
            Ok(outcome) => {
                if outcome == Toggle::Removed {
                    tracing::info!(person_id, "person deactivated");
                }
                let update = ServerMessage::PersonStateUpdate {
                    person_id: person_id.to_owned(),
                    active,
                };
                self.broadcaster.broadcast(Audience::All, &update);
                self.broadcast_catalog();
            }
            Err(e) => tracing::warn!(person_id, error = %e, "toggle ignored"),
        }
    }

    fn collect_person(&self, player_id: &PlayerId, person_id: &str) {
        if self.persons.collect(person_id).is_some() {
            tracing::info!(%player_id, person_id, "person collected");
            self.broadcast_catalog();
        } else {
            tracing::debug!(%player_id, person_id, "person already gone");
        }
    }

    fn set_carrying(&self, target: &PlayerId, has_person: String) {
        match self.players.set_carrying(target, has_person.as_str()) {
            Ok(()) => {
                let update = ServerMessage::PersonUpdate {
                    player_id: target.clone(),
                    has_person,
                };
                self.broadcaster.broadcast(Audience::All, &update);
            }
            Err(e) => {
                tracing::warn!(player_id = %target, error = %e, "carrying update ignored");
            }
        }
    }

    fn move_player(&self, player_id: &PlayerId, update: &PositionUpdate) {
        if !self.players.apply_position(player_id, update) {
            tracing::debug!(%player_id, "move for removed player");
            return;
        }
        let positions = ServerMessage::Positions {
            players: self.players.positions(),
        };
        self.broadcaster.broadcast(Audience::All, &positions);
    }

    fn reply_error(&self, player_id: &PlayerId, message: &str) {
        if let Some(handle) = self.sessions.handle(player_id) {
            let error = ServerMessage::Error {
                message: message.to_owned(),
            };
            self.broadcaster.unicast(&handle, &error);
        }
    }
}
