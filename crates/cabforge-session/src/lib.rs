//! Player session management for Cabforge.
//!
//! This crate handles who is connected:
//!
//! 1. **Identity** — allocating a random plate per connection ([`generate_plate`])
//! 2. **Handles** — a non-blocking outbound queue per connection ([`SessionHandle`])
//! 3. **Registry** — mapping connections, plates, handles and roles ([`SessionRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! World / Engine (above)  ← uses sessions to know who to broadcast to
//!     ↕
//! Session Layer (this crate)  ← manages player identity and live handles
//!     ↕
//! Protocol / Transport (below)  ← provide PlayerId, Role, ConnectionId
//! ```

mod error;
mod plate;
mod registry;
mod session;

pub use error::SessionError;
pub use plate::{PLATE_LEN, generate_plate, is_plate};
pub use registry::SessionRegistry;
pub use session::{Frame, FrameReceiver, SessionConfig, SessionHandle};
