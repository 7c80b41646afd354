//! Codec trait and implementations for serializing/deserializing bodies.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The protocol layer doesn't care HOW bodies are serialized; it just
//! needs something that implements the [`Codec`] trait.
//!
//! The REST API speaks JSON, so [`JsonCodec`] is the only implementation.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: the codec is shared with the background refresh task,
///   which Tokio may run on any worker thread.
/// - `'static`: the codec owns everything it needs.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input bytes, so the response buffer can be
/// dropped right after decoding.
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
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use screener_protocol::{Codec, JsonCodec, TokenPair};
///
/// let codec = JsonCodec;
/// let pair = TokenPair::new("a.b.c", "r1");
///
/// let bytes = codec.encode(&pair).unwrap();
/// let decoded: TokenPair = codec.decode(&bytes).unwrap();
/// assert_eq!(pair, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
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
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Credentials, TokenPair};

    #[test]
    fn test_json_codec_encode_credentials_matches_api_shape() {
        let codec = JsonCodec;
        let bytes = codec
            .encode(&Credentials::new("bob", "hunter22"))
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "username": "bob", "password": "hunter22" })
        );
    }

    #[test]
    fn test_json_codec_decode_html_error_page_fails() {
        let codec = JsonCodec;
        let result: Result<TokenPair, _> =
            codec.decode(b"<html><body>Bad Gateway</body></html>");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_missing_refresh_fails() {
        let codec = JsonCodec;
        let result: Result<TokenPair, _> = codec.decode(br#"{"access":"a.b.c"}"#);
        assert!(result.is_err(), "a token pair needs both tokens");
    }
}
