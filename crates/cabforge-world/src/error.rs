//! Error types for the world layer.

use cabforge_protocol::PlayerId;

/// Errors that can occur when mutating world state.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// No player with this plate exists in the directory.
    #[error("player {0} not found")]
    UnknownPlayer(PlayerId),

    /// No collectible with this id is available. Either it never existed
    /// or it was already collected.
    #[error("person {0} not found")]
    UnknownPerson(String),
}
