//! Leaderboard configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::LeaderboardError;

/// Turns a score (already divided by the storage multiplier) into display
/// text.
pub type ValueRenderer = Arc<dyn Fn(f64) -> String + Send + Sync>;

// ---------------------------------------------------------------------------
// SortOrder / Mode
// ---------------------------------------------------------------------------

/// The order the backend ranks scores in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Ascending,
    /// Highest score is rank 1.
    #[default]
    Descending,
}

impl SortOrder {
    pub fn is_ascending(self) -> bool {
        matches!(self, Self::Ascending)
    }
}

/// Which slice of the leaderboard to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// The global top, starting at rank 1.
    #[default]
    World,
    /// The rows around the current player's own rank.
    #[serde(alias = "player")]
    AroundPlayer,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World => write!(f, "world"),
            Self::AroundPlayer => write!(f, "around-player"),
        }
    }
}

// ---------------------------------------------------------------------------
// ScoreType
// ---------------------------------------------------------------------------

/// What a leaderboard's scores mean. Picks the sort order and renderer.
///
/// Time-based types expect scores in deciseconds; use the storage
/// multiplier to convert from other units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreType {
    /// Points; higher is better.
    #[default]
    Score,
    /// Penalty points; lower is better.
    Penalty,
    /// A duration where longer is better (survival time).
    #[serde(alias = "time-long", alias = "longest time")]
    LongestTime,
    /// A duration where shorter is better (race time).
    #[serde(alias = "time-short", alias = "fastest time")]
    FastestTime,
}

impl ScoreType {
    pub fn sort_order(self) -> SortOrder {
        match self {
            Self::Score | Self::LongestTime => SortOrder::Descending,
            Self::Penalty | Self::FastestTime => SortOrder::Ascending,
        }
    }

    pub fn is_time(self) -> bool {
        matches!(self, Self::LongestTime | Self::FastestTime)
    }

    pub fn renderer(self) -> ValueRenderer {
        if self.is_time() {
            Arc::new(duration_renderer)
        } else {
            Arc::new(plain_renderer)
        }
    }
}

/// Renders the number as-is (`50` for `50.0`, `2.5` for `2.5`).
pub fn plain_renderer(value: f64) -> String {
    value.to_string()
}

/// Renders deciseconds as `m:ss.d`.
///
/// ```
/// assert_eq!(arclink_leaderboard::duration_renderer(1234.0), "2:03.4");
/// ```
pub fn duration_renderer(deciseconds: f64) -> String {
    let total = deciseconds.max(0.0).floor() as u64;
    let tenths = total % 10;
    let seconds = (total / 10) % 60;
    let minutes = total / 600;
    format!("{minutes}:{seconds:02}.{tenths}")
}

// ---------------------------------------------------------------------------
// LeaderboardOptions
// ---------------------------------------------------------------------------

/// Fixed configuration of one [`LeaderboardManager`](crate::LeaderboardManager).
#[derive(Clone)]
pub struct LeaderboardOptions {
    pub sort_order: SortOrder,

    /// The view fetched and displayed at first.
    pub mode: Mode,

    /// Scores are multiplied by this and rounded before submission, and
    /// divided by it for display. Must be finite and nonzero.
    pub score_storage_multiplier: f64,

    /// How many rows to request. Must be positive.
    pub max_rows: u32,

    pub value_renderer: ValueRenderer,

    /// Use a private always-logged-in simulator instead of the session's
    /// backend.
    pub debug: bool,

    /// Pause between a score write and the board re-read, so the backend
    /// has indexed the new score.
    pub settle_delay: Duration,
}

impl LeaderboardOptions {
    /// Options with the sort order and renderer `score_type` calls for.
    pub fn for_score_type(score_type: ScoreType) -> Self {
        Self {
            sort_order: score_type.sort_order(),
            value_renderer: score_type.renderer(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), LeaderboardError> {
        let m = self.score_storage_multiplier;
        if m == 0.0 || !m.is_finite() {
            return Err(LeaderboardError::Configuration(format!(
                "score_storage_multiplier must be finite and nonzero, got {m}"
            )));
        }
        if self.max_rows == 0 {
            return Err(LeaderboardError::Configuration(
                "max_rows must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LeaderboardOptions {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::Descending,
            mode: Mode::World,
            score_storage_multiplier: 1.0,
            max_rows: 10,
            value_renderer: Arc::new(plain_renderer),
            debug: false,
            settle_delay: Duration::from_millis(400),
        }
    }
}

impl fmt::Debug for LeaderboardOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaderboardOptions")
            .field("sort_order", &self.sort_order)
            .field("mode", &self.mode)
            .field("score_storage_multiplier", &self.score_storage_multiplier)
            .field("max_rows", &self.max_rows)
            .field("debug", &self.debug)
            .field("settle_delay", &self.settle_delay)
            .finish_non_exhaustive()
    }
}
