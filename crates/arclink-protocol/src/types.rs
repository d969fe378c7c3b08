//! Core data types shared by the backend, session, and leaderboard layers.
//!
//! These are the shapes the arcade backend speaks. Field names follow the
//! backend's camelCase JSON, so every struct carries
//! `#[serde(rename_all = "camelCase")]`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Login status
// ---------------------------------------------------------------------------

/// Whether the current user is authenticated with the arcade backend.
///
/// Owned by the session hub; it only changes when a host status signal
/// arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoginStatus {
    #[default]
    LoggedOut,
    LoggedIn,
}

impl LoginStatus {
    /// Returns `true` for [`LoginStatus::LoggedIn`].
    pub fn is_logged_in(self) -> bool {
        matches!(self, Self::LoggedIn)
    }
}

impl From<bool> for LoginStatus {
    fn from(logged_in: bool) -> Self {
        if logged_in { Self::LoggedIn } else { Self::LoggedOut }
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedOut => write!(f, "LoggedOut"),
            Self::LoggedIn => write!(f, "LoggedIn"),
        }
    }
}

/// The host environment's login signal payload: `{"status": "connected"}`
/// or `{"status": "none"}`.
///
/// Anything other than `"connected"` counts as logged out, so an unknown
/// status string never logs a user in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatus {
    pub status: String,
}

impl HostStatus {
    /// The wire value for an authenticated user.
    pub const CONNECTED: &'static str = "connected";
    /// The wire value for no authenticated user.
    pub const NONE: &'static str = "none";

    pub fn connected() -> Self {
        Self { status: Self::CONNECTED.to_string() }
    }

    pub fn none() -> Self {
        Self { status: Self::NONE.to_string() }
    }

    /// Maps the raw status string onto a [`LoginStatus`].
    pub fn login_status(&self) -> LoginStatus {
        LoginStatus::from(self.status == Self::CONNECTED)
    }
}

impl From<LoginStatus> for HostStatus {
    fn from(status: LoginStatus) -> Self {
        match status {
            LoginStatus::LoggedIn => Self::connected(),
            LoginStatus::LoggedOut => Self::none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Identifier of a purchasable item.
///
/// Serialized as a bare string (`"golden-hat"`), not `{"0": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One item the game offers in its store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub item_id: ItemId,
    #[serde(default)]
    pub name: String,
    /// Price in arcade coins.
    pub price: u64,
}

/// Response of `getAmountCurrency`: either a balance or an error string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CurrencyResponse {
    pub fn balance(currency: i64) -> Self {
        Self { currency: Some(currency), error: None }
    }
}

/// Response of `getInventory`.
///
/// A response without an `inventory` field is malformed; the session hub
/// treats it like a failed fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryResponse {
    #[serde(default)]
    pub inventory: Option<Vec<ItemId>>,
}

/// Response of `getCatalog`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub catalog: Option<Vec<CatalogEntry>>,
}

/// Confirmation that an item was unlocked for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub item_id: ItemId,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The public part of the user's arcade profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
}

/// Response of `getUser`. The profile may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

/// One row of a leaderboard as the backend ranks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEntry {
    /// 1-based position assigned by the backend.
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Raw stored score: the submitted score times the leaderboard's
    /// storage multiplier, rounded to an integer.
    pub score: i64,
}

/// Parameters of a `getLeaderboard` read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub leaderboard_id: String,
    pub ascending: bool,
    pub around_player: bool,
    pub max_rows: u32,
}

/// Response of `getLeaderboard`.
///
/// `None` means the backend had no data for the query; the leaderboard
/// layer turns that into a retrieval error rather than an empty board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub leaderboard: Option<Vec<BoardEntry>>,
}
