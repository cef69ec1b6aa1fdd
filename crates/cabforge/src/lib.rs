//! # Cabforge
//!
//! Real-time state-sync server for a browser game where players drive
//! around a 2D map and pick up persons.
//!
//! Each WebSocket connection is assigned a random plate (`042QZT`),
//! becomes a player on its first game frame, and receives broadcasts of
//! everyone's positions, carrying flags and the remaining collectibles.
//! Sessions announcing the `admin` role also receive the player roster.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cabforge::prelude::*;
//!
//! # async fn start() -> Result<(), CabforgeError> {
//! let server = CabforgeServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod broadcast;
mod engine;
mod error;
mod handler;
mod router;
mod server;

pub use broadcast::{Audience, Broadcaster};
pub use engine::GameEngine;
pub use error::CabforgeError;
pub use router::PROCESSING_ERROR;
pub use server::{CabforgeServer, CabforgeServerBuilder, DEFAULT_BIND_ADDR, DEFAULT_PATH};

/// Convenient re-exports for embedding the server.
pub mod prelude {
    pub use crate::{
        Audience, CabforgeError, CabforgeServer, CabforgeServerBuilder, GameEngine,
        PROCESSING_ERROR,
    };
    pub use cabforge_protocol::{PlayerId, Role, ServerMessage};
    pub use cabforge_session::{SessionConfig, SessionError, SessionHandle};
    pub use cabforge_transport::ConnectionId;
    pub use cabforge_world::{Collectible, SpawnDefaults, WorldConfig};
}
