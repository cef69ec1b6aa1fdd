//! Error types for the protocol layer.
//!
//! Each crate in Cabforge defines its own error enum. A `ProtocolError`
//! always means the problem is in the shape of a frame: it failed to
//! serialize, failed to parse, or parsed into something the router can't
//! accept. None of these are fatal; the engine turns them into an
//! `error` frame for the sender.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into a frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not valid JSON.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame is valid JSON but not something the router accepts,
    /// e.g. a bare array instead of an object.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A field the router inspects has the wrong JSON type.
    ///
    /// For example `"hasPerson": true` (must be a string or an integer)
    /// or `"x": "left"` (must be a number).
    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}
