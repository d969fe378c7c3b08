//! Leaderboard submission and cached ranked views for Arclink.
//!
//! A [`LeaderboardManager`] owns one leaderboard id. It scales scores into
//! the integral form the backend stores, submits them (or holds the latest
//! one until the user logs in), and keeps two cached boards: the world top
//! and the slice around the player.
//!
//! # Key types
//!
//! - [`LeaderboardManager`]: submit, fetch, and read cached boards
//! - [`LeaderboardOptions`]: sort order, mode, multiplier, row cap, renderer
//! - [`ScoreType`]: presets for sort order and rendering
//! - [`Columns`]: the current board as three display columns

mod columns;
mod error;
mod manager;
mod options;

pub use columns::{Columns, RenderedColumns};
pub use error::LeaderboardError;
pub use manager::{LeaderboardManager, SubmitOutcome};
pub use options::{
    LeaderboardOptions, Mode, ScoreType, SortOrder, ValueRenderer, duration_renderer,
    plain_renderer,
};
