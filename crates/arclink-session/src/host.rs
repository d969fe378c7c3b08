//! The host environment the session runs inside.
//!
//! A game embeds Arclink in some host (a browser shell, an engine, a
//! headless test). The hub needs exactly two things from it: ending an
//! immersive (XR) session before showing a 2D prompt, and running the
//! external coin-store flow.

use async_trait::async_trait;

/// Host integration points used by [`SessionHub`](crate::SessionHub).
#[async_trait]
pub trait Host: Send + Sync + 'static {
    /// Whether an immersive session is currently presenting.
    fn is_immersive_session_active(&self) -> bool;

    /// Ends the immersive session. Resolves once the host is back in 2D.
    async fn end_immersive_session(&self);

    /// Opens the coin store and resolves when the user closes it.
    async fn open_coin_store(&self);
}

/// A host with no immersive session and no coin-store UI.
///
/// Opening the coin store logs and completes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessHost;

#[async_trait]
impl Host for HeadlessHost {
    fn is_immersive_session_active(&self) -> bool {
        false
    }

    async fn end_immersive_session(&self) {}

    async fn open_coin_store(&self) {
        tracing::info!("coin store requested on a headless host");
    }
}
