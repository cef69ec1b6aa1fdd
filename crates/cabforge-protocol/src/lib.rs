//! Wire protocol for Cabforge.
//!
//! This crate defines the "language" clients and the server speak:
//!
//! - **Types** ([`ServerMessage`], [`PlayerStates`], [`PlayerId`],
//!   [`Role`]) — the frames the server sends.
//! - **Inbound** ([`Inbound`], [`Action`]) — how a client frame is
//!   classified by which fields it carries.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how frames are
//!   converted to/from text.
//! - **Errors** ([`ProtocolError`]) — what can go wrong along the way.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw text frames) and the
//! session/world layers. It doesn't know about connections or game state.
//!
//! ```text
//! Transport (text) → Protocol (Inbound / ServerMessage) → Engine
//! ```

mod codec;
mod error;
mod inbound;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use inbound::{Action, Inbound, PositionUpdate};
pub use types::{
    PersonView, PlayerId, PlayerStateView, PlayerStates, PositionView, Role,
    RosterEntry, ServerMessage,
};
