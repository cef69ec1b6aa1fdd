//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust types and frames. The
//! broadcast engine only needs something that implements [`Codec`]; it
//! doesn't care which format sits underneath. Cabforge speaks JSON text
//! frames, so [`JsonCodec`] is the one implementation.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between threads (every connection task
///   holds the same engine, and with it the same codec).
/// - `'static` → the codec owns everything it needs, so it can live as
///   long as the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// Serializes a value into a text frame.
    ///
    /// The default goes through [`encode`](Self::encode) and rejects
    /// output that isn't UTF-8.
    fn encode_text<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes).map_err(|e| {
            ProtocolError::InvalidMessage(format!(
                "encoded frame is not UTF-8: {e}"
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use cabforge_protocol::{Codec, JsonCodec, PlayerId, ServerMessage};
///
/// let codec = JsonCodec;
/// let msg = ServerMessage::AssignId { player_id: PlayerId::new("123ABC") };
///
/// let text = codec.encode_text(&msg).unwrap();
/// assert_eq!(text, r#"{"type":"PLAYER_ID","playerId":"123ABC"}"#);
///
/// let decoded: ServerMessage = codec.decode(text.as_bytes()).unwrap();
/// assert_eq!(decoded, msg);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn encode_text<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        // serde_json already produces a String; skip the UTF-8 recheck.
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<serde_json::Value, _> =
            JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_encode_text_matches_encode_bytes() {
        let value = serde_json::json!({"type": "error", "message": "bad"});
        let text = JsonCodec.encode_text(&value).unwrap();
        let bytes = JsonCodec.encode(&value).unwrap();
        assert_eq!(text.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_encode_text_default_impl_rejects_non_utf8() {
        // A codec whose byte output isn't UTF-8 must not yield a frame.
        struct RawCodec;
        impl Codec for RawCodec {
            fn encode<T: Serialize>(
                &self,
                _value: &T,
            ) -> Result<Vec<u8>, ProtocolError> {
                Ok(vec![0xff, 0xfe])
            }
            fn decode<T: DeserializeOwned>(
                &self,
                _data: &[u8],
            ) -> Result<T, ProtocolError> {
                Err(ProtocolError::InvalidMessage("unused".into()))
            }
        }

        let result = RawCodec.encode_text(&1u8);
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }
}
