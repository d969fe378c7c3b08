//! The [`Backend`] trait: the arcade operation set.

use std::fmt;
use std::sync::Arc;

use arclink_protocol::{
    CatalogResponse, CurrencyResponse, InventoryResponse, ItemId, LeaderboardQuery,
    LeaderboardResponse, LoginStatus, PurchaseReceipt, UserResponse,
};
use async_trait::async_trait;

use crate::BackendError;

/// Receives the host's login-status signal.
///
/// Called synchronously by the backend whenever the status changes, from
/// whatever task observed the change.
pub type StatusSink = Arc<dyn Fn(LoginStatus) + Send + Sync>;

/// Which implementation a [`Backend`] is. Used for logging, and by
/// leaderboards to switch to their own simulator when the session has no
/// real backend. Session logic never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Live,
    Simulated,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// The arcade backend operation set.
///
/// Object safe (via `async_trait`) so the session hub can hold an
/// `Arc<dyn Backend>` and swap implementations on re-initialization.
///
/// # Failure signals
///
/// Operations that the arcade answers with an error *field*
/// (`getAmountCurrency`) return `Ok` with that field set. Operations the
/// arcade *rejects* return `Err`.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    fn kind(&self) -> BackendKind;

    /// Routes future login-status changes to `sink`, replacing any
    /// previously attached sink.
    fn attach(&self, sink: StatusSink);

    /// Stops delivering login-status changes.
    fn detach(&self);

    /// Whether the backend currently considers the user logged in.
    fn is_logged_in(&self) -> bool;

    /// Opens the login prompt. Resolves with whether login was granted.
    async fn login_button_pressed(&self) -> Result<bool, BackendError>;

    async fn get_amount_currency(&self) -> Result<CurrencyResponse, BackendError>;

    async fn get_inventory(&self) -> Result<InventoryResponse, BackendError>;

    async fn get_catalog(&self, game_id: &str) -> Result<CatalogResponse, BackendError>;

    /// Buys `item_id` for `price` coins. Fails with
    /// [`BackendError::InsufficientFunds`] when the balance is too low.
    async fn purchase_item(
        &self,
        game_id: &str,
        item_id: &ItemId,
        price: u64,
    ) -> Result<PurchaseReceipt, BackendError>;

    async fn get_user(&self) -> Result<UserResponse, BackendError>;

    /// Stores `raw_score` on the leaderboard. The score is already scaled by
    /// the leaderboard's storage multiplier.
    async fn submit_score(&self, leaderboard_id: &str, raw_score: i64) -> Result<(), BackendError>;

    async fn get_leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<LeaderboardResponse, BackendError>;
}
