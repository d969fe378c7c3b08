//! Error types for the session layer.

use arclink_backend::BackendError;

/// Errors the session hub can return.
///
/// Most fetch failures never reach the caller: refreshes swallow them and
/// simply don't notify. What's left here are the failures a caller has to
/// act on.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No live gateway was supplied and debug mode was not requested, so
    /// there is nothing to talk to.
    #[error("no arcade gateway available and debug mode is off")]
    GatewayUnavailable,

    /// The hub hasn't been initialized (or was torn down).
    #[error("session hub is not initialized")]
    NotInitialized,

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
