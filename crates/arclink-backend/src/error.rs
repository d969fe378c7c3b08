//! Error types for the backend layer.

/// The rejection text the arcade backend uses when a purchase exceeds the
/// user's balance.
pub const INSUFFICIENT_FUNDS: &str = "Not enough funds";

/// Errors a backend operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend rejected the call with an error string.
    #[error("rejected by backend: {0}")]
    Rejected(String),

    /// A purchase was rejected because the user can't afford it.
    /// Kept apart from [`BackendError::Rejected`] because it routes to the
    /// coin store instead of surfacing as a failure.
    #[error("not enough funds")]
    InsufficientFunds,

    /// The gateway connection closed before the call was answered.
    #[error("gateway connection closed")]
    ConnectionClosed,

    /// The reply didn't have the shape the operation promises.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The connection failed while sending.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A frame couldn't be encoded.
    #[error(transparent)]
    Protocol(#[from] arclink_protocol::ProtocolError),
}

impl BackendError {
    /// Classifies a rejection string from the backend.
    pub fn from_rejection(error: impl Into<String>) -> Self {
        let error = error.into();
        if error == INSUFFICIENT_FUNDS {
            Self::InsufficientFunds
        } else {
            Self::Rejected(error)
        }
    }
}
