//! Error types for the leaderboard layer.

use arclink_backend::BackendError;
use arclink_session::SessionError;

/// Errors that can occur during leaderboard operations.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    /// The options can't describe a working leaderboard, e.g. a zero
    /// score multiplier. Raised at construction, before any network call.
    #[error("invalid leaderboard configuration: {0}")]
    Configuration(String),

    /// The backend answered a board read without any rows.
    #[error("retrieving leaderboard {0} failed: no entries returned")]
    Retrieval(String),

    /// The score can't be scaled to a stored integer.
    #[error("score {0} cannot be stored")]
    InvalidScore(f64),

    /// No backend to talk to (the session hub isn't initialized).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The backend rejected the call or the connection failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
