/// Frames that could not be turned into bytes or back.
///
/// Link failures are a `TransportError` in `arclink-transport`; this enum
/// only covers content. The source is whatever the [`Codec`](crate::Codec)
/// in use reported.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("could not encode frame: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Malformed bytes, or a reply whose shape doesn't fit the call it
    /// answers.
    #[error("could not decode frame: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}
