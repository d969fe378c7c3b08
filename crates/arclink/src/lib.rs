//! # Arclink
//!
//! Client-side session and leaderboard sync for arcade web games.
//!
//! Arclink sits between a game and its arcade backend. It tracks who is
//! logged in, caches their coins, inventory, catalog and profile, and keeps
//! leaderboards in step with submitted scores, holding a score until the
//! player logs in when needed. A built-in simulator stands in for the
//! backend during development.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arclink::prelude::*;
//!
//! # async fn run() -> Result<(), ArclinkError> {
//! let config = ArcadeConfig::from_json_str(r#"{
//!     "debug": true,
//!     "gameId": "space-race",
//!     "leaderboards": [{"id": "best-times", "scoreType": "fastestTime"}]
//! }"#)?;
//! let arcade = Arcade::builder().config(config).build().await?;
//!
//! arcade.hub().login().await?;
//! if let Some(board) = arcade.leaderboard("best-times") {
//!     board.submit(734.0).await?;
//!     println!("{}", board.columns());
//! }
//! # Ok(())
//! # }
//! ```

mod arcade;
pub mod config;
mod error;
pub mod logging;

pub use arcade::{Arcade, ArcadeBuilder};
pub use config::{ArcadeConfig, LeaderboardBinding};
pub use error::ArclinkError;

pub use arclink_backend as backend;
pub use arclink_leaderboard as leaderboard;
pub use arclink_protocol as protocol;
pub use arclink_session as session;
pub use arclink_transport as transport;

pub mod prelude {
    pub use crate::{Arcade, ArcadeBuilder, ArcadeConfig, ArclinkError, LeaderboardBinding};

    pub use arclink_backend::{
        Backend, BackendError, BackendKind, LiveGateway, Simulator, SimulatorConfig,
    };
    pub use arclink_leaderboard::{
        Columns, LeaderboardError, LeaderboardManager, LeaderboardOptions, Mode, ScoreType,
        SortOrder, SubmitOutcome,
    };
    pub use arclink_protocol::{BoardEntry, CatalogEntry, ItemId, LoginStatus, UserProfile};
    pub use arclink_session::{
        EventKind, HeadlessHost, Host, HubConfig, HubEvent, HubState, PurchaseOutcome,
        SessionError, SessionHub, Subscription,
    };
}
