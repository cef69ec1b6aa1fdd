//! World configuration: the collectible catalog and player spawn defaults.

use serde::{Deserialize, Serialize};

use crate::Collectible;

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

/// Configuration for the shared world.
///
/// The defaults reproduce the map the web client ships with. Embedders
/// can swap the catalog for their own map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Collectibles placed on the first connect. Never respawned.
    pub catalog: Vec<Collectible>,

    /// Initial state of a newly created player.
    pub spawn: SpawnDefaults,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            spawn: SpawnDefaults::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpawnDefaults
// ---------------------------------------------------------------------------

/// Where and how a player starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDefaults {
    pub x: f64,
    pub y: f64,
    pub direction: String,
    /// Carrying flag of a fresh player. `"0"` means empty-handed.
    pub carrying: String,
    /// Display name used when the first frame carries no `name`; the
    /// player's plate is appended.
    pub name_prefix: String,
}

impl Default for SpawnDefaults {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            direction: "right".to_owned(),
            carrying: "0".to_owned(),
            name_prefix: "Player_".to_owned(),
        }
    }
}

fn default_catalog() -> Vec<Collectible> {
    [
        ("p1", 4, 6, "PersonaCorbata.png"),
        ("p2", 8, 5, "PersonaNaranja.png"),
        ("p3", 10, 3, "mujer.png"),
        ("p4", 12, 7, "mujer1.png"),
        ("p5", 5, 5, "personaCampesino.png"),
        ("p6", 2, 4, "personaEstudiante.png"),
        ("p7", 6, 9, "personaVerde.png"),
        ("p8", 3, 4, "tombo.png"),
        ("p9", 14, 9, "tombo1.png"),
    ]
    .into_iter()
    .map(|(id, x, y, sprite)| Collectible::new(id, x, y, sprite))
    .collect()
}
