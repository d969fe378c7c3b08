//! Byte encoding for gateway frames.
//!
//! [`JsonCodec`] is what the arcade backend speaks. The [`Codec`] trait
//! keeps the gateway independent of it so tests and future backends can
//! swap the encoding.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns frames into message bytes and back.
///
/// A gateway shares its codec with its reader task, hence the bounds.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Fails with [`ProtocolError::Decode`] when the bytes don't parse as
    /// `T`, including well-formed JSON of the wrong shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// JSON frames, one object per message. Requires the `json` feature
/// (on by default).
///
/// ```
/// use arclink_protocol::{Codec, GatewayCall, GatewayRequest, JsonCodec, RequestId};
///
/// let codec = JsonCodec;
/// let request = GatewayRequest {
///     id: RequestId(7),
///     call: GatewayCall::GetUser,
/// };
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: GatewayRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(|e| ProtocolError::Encode(Box::new(e)))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| ProtocolError::Decode(Box::new(e)))
    }
}
