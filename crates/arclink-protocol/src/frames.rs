//! Gateway frames: the request/reply envelopes a live connection carries.
//!
//! Every outbound call gets a fresh [`RequestId`]; the backend answers with
//! a `reply` or `rejected` frame echoing that id. The backend may also push
//! `loginStatus` frames at any time, which is how the host's login signal
//! reaches a native client.
//!
//! ```text
//! client → {"id":4,"call":{"op":"submitScore","leaderboardId":"lb","score":120}}
//! server → {"type":"reply","id":4,"result":{}}
//! server → {"type":"loginStatus","status":"connected"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{HostStatus, ItemId, LeaderboardQuery};

/// Correlates a reply with the request that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// One outbound call to the arcade backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub id: RequestId,
    pub call: GatewayCall,
}

/// The backend operation set. One variant per operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GatewayCall {
    IsLoggedIn,
    LoginButtonPressed,
    GetAmountCurrency,
    GetInventory,
    GetCatalog {
        game_id: String,
    },
    PurchaseItem {
        game_id: String,
        item_id: ItemId,
        price: u64,
    },
    GetUser,
    SubmitScore {
        leaderboard_id: String,
        score: i64,
    },
    GetLeaderboard(LeaderboardQuery),
}

impl GatewayCall {
    /// Operation name as it appears on the wire, for logging.
    pub fn op(&self) -> &'static str {
        match self {
            Self::IsLoggedIn => "isLoggedIn",
            Self::LoginButtonPressed => "loginButtonPressed",
            Self::GetAmountCurrency => "getAmountCurrency",
            Self::GetInventory => "getInventory",
            Self::GetCatalog { .. } => "getCatalog",
            Self::PurchaseItem { .. } => "purchaseItem",
            Self::GetUser => "getUser",
            Self::SubmitScore { .. } => "submitScore",
            Self::GetLeaderboard(_) => "getLeaderboard",
        }
    }
}

/// One inbound frame from the arcade backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GatewayFrame {
    /// The call with this id succeeded. `result` holds the operation's
    /// response shape and is decoded by the caller.
    Reply {
        id: RequestId,
        #[serde(default)]
        result: serde_json::Value,
    },

    /// The call with this id was rejected with an error string.
    Rejected { id: RequestId, error: String },

    /// The host login signal changed.
    LoginStatus(HostStatus),
}
