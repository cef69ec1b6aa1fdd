//! Shared world state for Cabforge.
//!
//! # Key types
//!
//! - [`PlayerDirectory`] — every live player's name, position and carrying flag
//! - [`CollectibleRegistry`] — persons still available on the map
//! - [`WorldConfig`] — catalog and spawn defaults
//!
//! Both registries are concurrent maps with per-key atomic operations.
//! They know nothing about connections or frames; the engine composes
//! them with the session registry.

mod config;
mod error;
mod persons;
mod players;

pub use config::{SpawnDefaults, WorldConfig};
pub use error::WorldError;
pub use persons::{Collectible, CollectibleRegistry, Toggle};
pub use players::{Player, PlayerDirectory};
