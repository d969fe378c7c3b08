use crate::ConnectionId;

/// Failures of the link itself, as opposed to rejected gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The backend at `url` was unreachable or refused the upgrade.
    #[error("could not connect to {url}: {reason}")]
    ConnectFailed { url: String, reason: String },

    /// The link is gone; nothing more can be sent or received.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("{conn}: send failed: {reason}")]
    SendFailed { conn: ConnectionId, reason: String },

    #[error("{conn}: receive failed: {reason}")]
    ReceiveFailed { conn: ConnectionId, reason: String },
}
