//! The player directory.
//!
//! A player exists from the first game frame of its session until the
//! session ends. Role announcements never create one.

use std::collections::BTreeMap;

use cabforge_protocol::{
    PlayerId, PlayerStateView, PlayerStates, PositionUpdate, PositionView, RosterEntry,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::{SpawnDefaults, WorldError};

/// Game-side state of one connected player.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub direction: String,
    /// Carrying flag as the client sent it, `"0"` when empty-handed.
    pub carrying: String,
}

impl Player {
    fn spawn(id: &PlayerId, name: Option<&str>, defaults: &SpawnDefaults) -> Self {
        let name = match name {
            Some(name) => name.to_owned(),
            None => format!("{}{id}", defaults.name_prefix),
        };
        Self {
            id: id.clone(),
            name,
            x: defaults.x,
            y: defaults.y,
            direction: defaults.direction.clone(),
            carrying: defaults.carrying.clone(),
        }
    }

    pub fn position(&self) -> PositionView {
        PositionView {
            x: self.x,
            y: self.y,
            direction: self.direction.clone(),
        }
    }

    pub fn state(&self) -> PlayerStateView {
        PlayerStateView {
            x: self.x,
            y: self.y,
            direction: self.direction.clone(),
            has_person: self.carrying.clone(),
        }
    }
}

/// Every live player, keyed by plate.
#[derive(Debug, Default)]
pub struct PlayerDirectory {
    players: DashMap<PlayerId, Player>,
    spawn: SpawnDefaults,
}

impl PlayerDirectory {
    pub fn new(spawn: SpawnDefaults) -> Self {
        Self {
            players: DashMap::new(),
            spawn,
        }
    }

    /// Creates the player if it doesn't exist yet.
    ///
    /// Returns `true` when this call created it. `name` is only used on
    /// creation; an existing player keeps its name.
    pub fn ensure(&self, player_id: &PlayerId, name: Option<&str>) -> bool {
        match self.players.entry(player_id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let player = Player::spawn(player_id, name, &self.spawn);
                tracing::info!(%player_id, name = %player.name, "player created");
                slot.insert(player);
                true
            }
        }
    }

    /// Overwrites the position fields present in `update`.
    ///
    /// Returns `false` if the player doesn't exist.
    pub fn apply_position(&self, player_id: &PlayerId, update: &PositionUpdate) -> bool {
        let Some(mut player) = self.players.get_mut(player_id) else {
            return false;
        };
        if let Some(x) = update.x {
            player.x = x;
        }
        if let Some(y) = update.y {
            player.y = y;
        }
        if let Some(direction) = &update.direction {
            player.direction.clone_from(direction);
        }
        true
    }

    /// Sets a player's carrying flag.
    ///
    /// # Errors
    /// [`WorldError::UnknownPlayer`] if no such player exists.
    pub fn set_carrying(
        &self,
        player_id: &PlayerId,
        carrying: impl Into<String>,
    ) -> Result<(), WorldError> {
        let mut player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.clone()))?;
        player.carrying = carrying.into();
        Ok(())
    }

    pub fn remove(&self, player_id: &PlayerId) -> Option<Player> {
        self.players.remove(player_id).map(|(_, player)| player)
    }

    /// A copy of the player's current state.
    pub fn get(&self, player_id: &PlayerId) -> Option<Player> {
        self.players.get(player_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.players.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Positions of every player, for the `positions` broadcast.
    pub fn positions(&self) -> BTreeMap<PlayerId, PositionView> {
        self.players
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().position()))
            .collect()
    }

    /// Full state of every player, for the connect/disconnect snapshot.
    pub fn states(&self) -> PlayerStates {
        PlayerStates {
            players: self
                .players
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().state()))
                .collect(),
        }
    }

    /// Plate and name of every player, ordered by plate.
    pub fn roster(&self) -> Vec<RosterEntry> {
        let mut roster: Vec<RosterEntry> = self
            .players
            .iter()
            .map(|entry| RosterEntry {
                plate: entry.key().clone(),
                name: entry.value().name.clone(),
            })
            .collect();
        roster.sort_by(|a, b| a.plate.cmp(&b.plate));
        roster
    }
}
