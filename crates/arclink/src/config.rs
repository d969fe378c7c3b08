//! Arcade configuration loaded from JSON.
//!
//! ```json
//! {
//!   "debug": false,
//!   "gameId": "space-race",
//!   "gatewayUrl": "wss://arcade.example/gateway",
//!   "leaderboards": [
//!     {"id": "best-times", "scoreType": "fastestTime", "maxRows": 8},
//!     {"id": "high-score", "mode": "aroundPlayer", "scoreStorageMultiplier": 10}
//!   ]
//! }
//! ```
//!
//! Every field is optional. Unknown fields are rejected so typos surface.

use std::path::Path;

use arclink_leaderboard::{LeaderboardOptions, Mode, ScoreType};
use arclink_session::HubConfig;
use serde::{Deserialize, Serialize};

use crate::ArclinkError;

// ---------------------------------------------------------------------------
// ArcadeConfig
// ---------------------------------------------------------------------------

/// Everything needed to start a session and its leaderboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ArcadeConfig {
    /// Fall back to the simulator when there is no gateway.
    pub debug: bool,

    pub game_id: String,

    /// WebSocket address of the arcade gateway. Without one, the session
    /// runs simulated (if `debug` is set).
    pub gateway_url: Option<String>,

    pub leaderboards: Vec<LeaderboardBinding>,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            game_id: "your-game-id".to_string(),
            gateway_url: None,
            leaderboards: Vec::new(),
        }
    }
}

impl ArcadeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ArclinkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArclinkError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), leaderboards = config.leaderboards.len(), "arcade config loaded");
        Ok(config)
    }

    /// Session hub settings for this config.
    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            debug_mode: self.debug,
            game_id: self.game_id.clone(),
            ..HubConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// LeaderboardBinding
// ---------------------------------------------------------------------------

/// One leaderboard the game shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LeaderboardBinding {
    pub id: String,
    pub max_rows: u32,
    pub score_type: ScoreType,
    pub score_storage_multiplier: f64,
    pub mode: Mode,
    /// Give this leaderboard its own simulator even when the session is
    /// live.
    pub debug: bool,
}

impl Default for LeaderboardBinding {
    fn default() -> Self {
        Self {
            id: String::new(),
            max_rows: 8,
            score_type: ScoreType::Score,
            score_storage_multiplier: 1.0,
            mode: Mode::World,
            debug: false,
        }
    }
}

impl LeaderboardBinding {
    /// Manager options for this binding. The sort order and renderer come
    /// from the score type.
    pub fn options(&self) -> LeaderboardOptions {
        LeaderboardOptions {
            mode: self.mode,
            max_rows: self.max_rows,
            score_storage_multiplier: self.score_storage_multiplier,
            debug: self.debug,
            ..LeaderboardOptions::for_score_type(self.score_type)
        }
    }
}
