//! Offline simulator: fabricates arcade responses after an artificial delay.
//!
//! The simulator answers every operation with the same shapes the live
//! backend uses, so the layers above can't tell them apart except by
//! latency and by the data being made up. A little state is kept so the
//! flows hang together: logging in flips the simulated user to logged in
//! (and emits the status signal), purchases deduct from the simulated
//! balance and add to the simulated inventory. Submitted scores are
//! accepted and forgotten.
//!
//! # Fabricated leaderboards
//!
//! Each read returns `max_rows + 2` rows, capped at 1000. Ranks start at
//! [`WORLD_RANK_OFFSET`] for world views and [`AROUND_PLAYER_RANK_OFFSET`]
//! for around-player views. Scores are a random walk from 10 (ascending)
//! or 10 000 (descending), moving at most 100 raw units per row in the
//! sort direction.

use std::time::Duration;

use arclink_protocol::{
    BoardEntry, CatalogEntry, CatalogResponse, CurrencyResponse, InventoryResponse, ItemId,
    LeaderboardQuery, LeaderboardResponse, LoginStatus, PurchaseReceipt, UserProfile,
    UserResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time;

use crate::{Backend, BackendError, BackendKind, INSUFFICIENT_FUNDS, StatusSink};

/// First rank of a fabricated world leaderboard.
pub const WORLD_RANK_OFFSET: u32 = 1;

/// First rank of a fabricated around-player leaderboard. Deliberately not 1,
/// so a debug view makes it obvious the player isn't on top.
pub const AROUND_PLAYER_RANK_OFFSET: u32 = 12;

const ASCENDING_START: i64 = 10;
const DESCENDING_START: i64 = 10_000;
const MAX_STEP: f64 = 100.0;
/// Upper bound on fabricated rows, whatever `max_rows` asks for.
const MAX_FABRICATED_ROWS: u32 = 1_000;

/// Tunables for the [`Simulator`].
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Delay before any read or purchase resolves.
    pub response_delay: Duration,
    /// Delay before a login prompt is "granted".
    pub login_delay: Duration,
    /// Delay before a score submission is acknowledged.
    pub submit_delay: Duration,
    pub starting_balance: i64,
    pub starting_inventory: Vec<ItemId>,
    pub catalog: Vec<CatalogEntry>,
    pub display_name: String,
    /// Seed for the leaderboard walk. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            response_delay: Duration::from_millis(1000),
            login_delay: Duration::from_millis(1000),
            submit_delay: Duration::from_millis(1600),
            starting_balance: 42,
            starting_inventory: vec![ItemId::new("debug")],
            catalog: vec![
                CatalogEntry {
                    item_id: ItemId::new("debug"),
                    name: "Debug Badge".to_string(),
                    price: 5,
                },
                CatalogEntry {
                    item_id: ItemId::new("golden-hat"),
                    name: "Golden Hat".to_string(),
                    price: 100,
                },
            ],
            display_name: "WonderfulUser".to_string(),
            rng_seed: None,
        }
    }
}

/// A [`Backend`] that makes everything up.
pub struct Simulator {
    config: SimulatorConfig,
    state: Mutex<SimState>,
    rng: Mutex<StdRng>,
    sink: Mutex<Option<StatusSink>>,
}

#[derive(Debug)]
struct SimState {
    logged_in: bool,
    balance: i64,
    inventory: Vec<ItemId>,
}

impl Simulator {
    /// Creates a simulator whose user starts logged out.
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_login(config, false)
    }

    /// Creates a sandbox whose user is always logged in.
    ///
    /// Used by leaderboards that force debug mode while the session runs
    /// against a live backend: their submissions go straight through.
    pub fn detached() -> Self {
        Self::with_login(SimulatorConfig::default(), true)
    }

    fn with_login(config: SimulatorConfig, logged_in: bool) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let state = SimState {
            logged_in,
            balance: config.starting_balance,
            inventory: config.starting_inventory.clone(),
        };
        Self {
            config,
            state: Mutex::new(state),
            rng: Mutex::new(rng),
            sink: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Logs the simulated user out and emits the status signal, as if the
    /// host had ended the session.
    pub fn logout(&self) {
        self.state.lock().logged_in = false;
        self.emit(LoginStatus::LoggedOut);
    }

    /// Current simulated balance.
    pub fn balance(&self) -> i64 {
        self.state.lock().balance
    }

    /// Adds coins to the simulated balance, as a finished coin-store visit
    /// would.
    pub fn grant_coins(&self, amount: i64) {
        self.state.lock().balance += amount;
    }

    fn emit(&self, status: LoginStatus) {
        // Clone out of the lock: the sink re-enters the session hub.
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(status);
        }
    }

    fn fabricate_board(&self, query: &LeaderboardQuery) -> Vec<BoardEntry> {
        let offset = if query.around_player {
            AROUND_PLAYER_RANK_OFFSET
        } else {
            WORLD_RANK_OFFSET
        };
        let descending = !query.ascending;
        let mut score = if descending { DESCENDING_START } else { ASCENDING_START };

        let mut rng = self.rng.lock();
        let rows = query.max_rows.saturating_add(2).min(MAX_FABRICATED_ROWS);
        (0..rows)
            .map(|i| {
                let step = (MAX_STEP * rng.random::<f64>()).round() as i64;
                score = if descending { score - step } else { score + step };
                BoardEntry {
                    rank: offset.saturating_add(i),
                    display_name: Some(format!("User{i}")),
                    score,
                }
            })
            .collect()
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

#[async_trait]
impl Backend for Simulator {
    fn kind(&self) -> BackendKind {
        BackendKind::Simulated
    }

    fn attach(&self, sink: StatusSink) {
        *self.sink.lock() = Some(sink);
    }

    fn detach(&self) {
        self.sink.lock().take();
    }

    fn is_logged_in(&self) -> bool {
        self.state.lock().logged_in
    }

    async fn login_button_pressed(&self) -> Result<bool, BackendError> {
        time::sleep(self.config.login_delay).await;
        self.state.lock().logged_in = true;
        tracing::debug!("simulated login granted");
        self.emit(LoginStatus::LoggedIn);
        Ok(true)
    }

    async fn get_amount_currency(&self) -> Result<CurrencyResponse, BackendError> {
        time::sleep(self.config.response_delay).await;
        Ok(CurrencyResponse::balance(self.balance()))
    }

    async fn get_inventory(&self) -> Result<InventoryResponse, BackendError> {
        time::sleep(self.config.response_delay).await;
        let inventory = self.state.lock().inventory.clone();
        Ok(InventoryResponse {
            inventory: Some(inventory),
        })
    }

    async fn get_catalog(&self, game_id: &str) -> Result<CatalogResponse, BackendError> {
        time::sleep(self.config.response_delay).await;
        tracing::debug!(game_id, "simulated catalog");
        Ok(CatalogResponse {
            catalog: Some(self.config.catalog.clone()),
        })
    }

    async fn purchase_item(
        &self,
        game_id: &str,
        item_id: &ItemId,
        price: u64,
    ) -> Result<PurchaseReceipt, BackendError> {
        time::sleep(self.config.response_delay).await;
        let mut state = self.state.lock();
        if !state.logged_in {
            return Err(BackendError::from_rejection("Not logged in"));
        }
        let price = i64::try_from(price)
            .map_err(|_| BackendError::from_rejection(INSUFFICIENT_FUNDS))?;
        if price > state.balance {
            return Err(BackendError::from_rejection(INSUFFICIENT_FUNDS));
        }
        state.balance -= price;
        if !state.inventory.contains(item_id) {
            state.inventory.push(item_id.clone());
        }
        tracing::debug!(game_id, %item_id, price, "simulated purchase");
        Ok(PurchaseReceipt {
            item_id: item_id.clone(),
        })
    }

    async fn get_user(&self) -> Result<UserResponse, BackendError> {
        time::sleep(self.config.response_delay).await;
        Ok(UserResponse {
            user: Some(UserProfile {
                display_name: self.config.display_name.clone(),
            }),
        })
    }

    async fn submit_score(&self, leaderboard_id: &str, raw_score: i64) -> Result<(), BackendError> {
        time::sleep(self.config.submit_delay).await;
        tracing::debug!(leaderboard_id, raw_score, "simulated submission discarded");
        Ok(())
    }

    async fn get_leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<LeaderboardResponse, BackendError> {
        time::sleep(self.config.response_delay).await;
        Ok(LeaderboardResponse {
            leaderboard: Some(self.fabricate_board(query)),
        })
    }
}
