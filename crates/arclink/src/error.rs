//! Unified error type for Arclink.

use arclink_backend::BackendError;
use arclink_leaderboard::LeaderboardError;
use arclink_protocol::ProtocolError;
use arclink_session::SessionError;
use arclink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ArclinkError {
    /// A connection-level error (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A backend call was rejected or failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The session hub could not do what was asked.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A leaderboard operation failed.
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),

    /// The configuration file is not valid JSON for [`ArcadeConfig`](crate::ArcadeConfig).
    #[error("invalid arcade config: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("reading arcade config failed: {0}")]
    Io(#[from] std::io::Error),
}
