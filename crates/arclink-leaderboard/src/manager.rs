//! The leaderboard manager: submission, deferral, and board caches.
//!
//! ## Submission
//!
//! ```text
//! submit(score)
//!   │  raw = round(score × multiplier); both caches cleared
//!   ├── logged in ──→ submit_score → settle delay → fetch board → Submitted
//!   └── logged out ─→ pending = raw (replaces any older pending score)
//!                     login hook registered once           → Deferred
//!
//! login hook (LoginStatusChanged(true))
//!   take pending → submit_score ─┬─ ok  → unregister hook, settle, re-fetch
//!                                └─ err → put pending back, keep hook
//! ```
//!
//! A score deferred while an older one is still on its way keeps the hook
//! alive; it goes out on the next login, or straight away if the user is
//! already logged in again by the time the older send finishes.
//!
//! In debug mode, and whenever the session itself is simulated, the manager
//! talks to a private always-logged-in simulator instead, so `submit` never
//! defers there.
//!
//! Every submit bumps a cache generation. A board read that started before
//! the latest submit is returned to its caller but never cached, so the
//! caches only ever hold boards that could contain the newest score.

use std::sync::{Arc, Weak};

use arclink_backend::{Backend, BackendKind, Simulator};
use arclink_protocol::{BoardEntry, LeaderboardQuery};
use arclink_session::{SessionHub, Subscription};
use parking_lot::Mutex;

use crate::{Columns, LeaderboardError, LeaderboardOptions, Mode};

/// What [`LeaderboardManager::submit`] did with a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The score was stored; this is the board re-read after the settle
    /// delay.
    Submitted(Vec<BoardEntry>),
    /// The user is logged out. The score waits for the next login.
    Deferred,
}

/// Submits scores to, and caches boards from, one leaderboard.
///
/// Cheap to clone; clones share caches and the pending score.
#[derive(Clone)]
pub struct LeaderboardManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    leaderboard_id: String,
    options: LeaderboardOptions,
    hub: SessionHub,
    /// Private simulator that is always logged in. Used when `options.debug`
    /// is set or the session has no real backend.
    sandbox: Arc<dyn Backend>,
    state: Mutex<BoardState>,
}

#[derive(Default)]
struct BoardState {
    pending_score: Option<i64>,
    login_hook: Option<Subscription>,
    world: Option<Vec<BoardEntry>>,
    around_player: Option<Vec<BoardEntry>>,
    displayed_mode: Mode,
    generation: u64,
}

impl BoardState {
    fn cache(&self, mode: Mode) -> &Option<Vec<BoardEntry>> {
        match mode {
            Mode::World => &self.world,
            Mode::AroundPlayer => &self.around_player,
        }
    }

    fn cache_mut(&mut self, mode: Mode) -> &mut Option<Vec<BoardEntry>> {
        match mode {
            Mode::World => &mut self.world,
            Mode::AroundPlayer => &mut self.around_player,
        }
    }

    fn invalidate(&mut self) {
        self.world = None;
        self.around_player = None;
        self.generation += 1;
    }
}

impl LeaderboardManager {
    /// Creates a manager for `leaderboard_id`.
    ///
    /// Fails with [`LeaderboardError::Configuration`] if the options are
    /// invalid. Nothing is fetched here; call
    /// [`get_leaderboard`](Self::get_leaderboard) for the first board.
    pub fn new(
        leaderboard_id: impl Into<String>,
        options: LeaderboardOptions,
        hub: SessionHub,
    ) -> Result<Self, LeaderboardError> {
        options.validate()?;
        let leaderboard_id = leaderboard_id.into();

        let sandbox: Arc<dyn Backend> = Arc::new(Simulator::detached());
        tracing::debug!(
            leaderboard = %leaderboard_id,
            mode = %options.mode,
            debug = options.debug,
            "leaderboard manager created"
        );

        let state = BoardState {
            displayed_mode: options.mode,
            ..BoardState::default()
        };
        Ok(Self {
            inner: Arc::new(ManagerInner {
                leaderboard_id,
                options,
                hub,
                sandbox,
                state: Mutex::new(state),
            }),
        })
    }

    // -- Submission -------------------------------------------------------

    /// Submits `score`, scaled by the storage multiplier and rounded.
    ///
    /// Both cached boards are cleared before anything else happens. When the
    /// user is logged out the raw score becomes the pending score and
    /// [`SubmitOutcome::Deferred`] is returned; only the most recent pending
    /// score is ever sent, once, on the next login.
    pub async fn submit(&self, score: f64) -> Result<SubmitOutcome, LeaderboardError> {
        let raw_score = self.to_raw(score)?;
        self.inner.state.lock().invalidate();

        let backend = self.backend()?;
        if !backend.is_logged_in() {
            self.defer(raw_score);
            return Ok(SubmitOutcome::Deferred);
        }

        let id = &self.inner.leaderboard_id;
        backend.submit_score(id, raw_score).await?;
        tracing::info!(leaderboard = %id, raw_score, "score submitted");

        tokio::time::sleep(self.inner.options.settle_delay).await;
        let board = self.get_leaderboard().await?;
        Ok(SubmitOutcome::Submitted(board))
    }

    fn to_raw(&self, score: f64) -> Result<i64, LeaderboardError> {
        let raw = (score * self.inner.options.score_storage_multiplier).round();
        if !raw.is_finite() || raw < i64::MIN as f64 || raw >= i64::MAX as f64 {
            return Err(LeaderboardError::InvalidScore(score));
        }
        Ok(raw as i64)
    }

    fn defer(&self, raw_score: i64) {
        let mut state = self.inner.state.lock();
        let replaced = state.pending_score.replace(raw_score);
        tracing::info!(
            leaderboard = %self.inner.leaderboard_id,
            raw_score,
            replaced = ?replaced,
            "logged out; score held until login"
        );

        if state.login_hook.is_none() {
            let weak = Arc::downgrade(&self.inner);
            let hook = self.inner.hub.on_login_status_changed(move |logged_in| {
                if logged_in {
                    Self::flush_pending(&weak);
                }
            });
            state.login_hook = Some(hook);
        }
    }

    /// Runs on login: sends the pending score in the background.
    fn flush_pending(weak: &Weak<ManagerInner>) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let manager = LeaderboardManager { inner };
        let Some(raw_score) = manager.inner.state.lock().pending_score.take() else {
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime; pending score stays queued");
            manager.restore_pending(raw_score);
            return;
        };
        runtime.spawn(async move {
            manager.submit_pending(raw_score).await;
        });
    }

    async fn submit_pending(&self, raw_score: i64) {
        let id = &self.inner.leaderboard_id;
        let result = match self.backend() {
            Ok(backend) => backend
                .submit_score(id, raw_score)
                .await
                .map_err(LeaderboardError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(leaderboard = %id, raw_score, error = %e, "pending score submission failed");
            self.restore_pending(raw_score);
            return;
        }
        tracing::info!(leaderboard = %id, raw_score, "pending score submitted");

        let (hook, newer) = {
            let mut state = self.inner.state.lock();
            match state.pending_score {
                None => (state.login_hook.take(), None),
                Some(newer) => (None, Some(newer)),
            }
        };
        if let Some(hook) = hook {
            self.inner.hub.unsubscribe(hook);
        }
        if let Some(newer) = newer {
            tracing::debug!(
                leaderboard = %id,
                raw_score = newer,
                "newer score deferred meanwhile; hook kept"
            );
            if self.backend().is_ok_and(|backend| backend.is_logged_in()) {
                Self::flush_pending(&Arc::downgrade(&self.inner));
            }
        }

        tokio::time::sleep(self.inner.options.settle_delay).await;
        if let Err(e) = self.get_leaderboard().await {
            tracing::warn!(leaderboard = %id, error = %e, "board refresh after pending submit failed");
        }
    }

    /// Puts a score back unless a newer one arrived meanwhile.
    fn restore_pending(&self, raw_score: i64) {
        let mut state = self.inner.state.lock();
        if state.pending_score.is_none() {
            state.pending_score = Some(raw_score);
        }
    }

    // -- Boards -----------------------------------------------------------

    /// Fetches the board for the displayed mode and caches it.
    pub async fn get_leaderboard(&self) -> Result<Vec<BoardEntry>, LeaderboardError> {
        let mode = self.displayed_mode();
        self.get_leaderboard_for(mode).await
    }

    /// Fetches the board for `mode` and caches it under that mode.
    ///
    /// An empty or missing board is a [`LeaderboardError::Retrieval`]. The
    /// backend's order and ranks are kept as they are.
    pub async fn get_leaderboard_for(
        &self,
        mode: Mode,
    ) -> Result<Vec<BoardEntry>, LeaderboardError> {
        let generation = self.inner.state.lock().generation;
        let backend = self.backend()?;
        let options = &self.inner.options;
        let query = LeaderboardQuery {
            leaderboard_id: self.inner.leaderboard_id.clone(),
            ascending: options.sort_order.is_ascending(),
            around_player: mode == Mode::AroundPlayer,
            max_rows: options.max_rows,
        };

        let response = backend.get_leaderboard(&query).await?;
        let board = response
            .leaderboard
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| LeaderboardError::Retrieval(query.leaderboard_id.clone()))?;

        let mut state = self.inner.state.lock();
        if state.generation == generation {
            *state.cache_mut(mode) = Some(board.clone());
            tracing::debug!(leaderboard = %query.leaderboard_id, %mode, rows = board.len(), "board cached");
        } else {
            tracing::debug!(leaderboard = %query.leaderboard_id, %mode, "board predates a newer submit; not cached");
        }
        Ok(board)
    }

    /// Switches which cache [`board`](Self::board) and
    /// [`columns`](Self::columns) read from. Does not fetch.
    pub fn set_displayed_mode(&self, mode: Mode) {
        self.inner.state.lock().displayed_mode = mode;
    }

    pub fn displayed_mode(&self) -> Mode {
        self.inner.state.lock().displayed_mode
    }

    /// The cached board for the displayed mode. `None` until fetched and
    /// after every submit.
    pub fn board(&self) -> Option<Vec<BoardEntry>> {
        let state = self.inner.state.lock();
        state.cache(state.displayed_mode).clone()
    }

    pub fn cached_board(&self, mode: Mode) -> Option<Vec<BoardEntry>> {
        self.inner.state.lock().cache(mode).clone()
    }

    /// The displayed board as rank, name, and rendered-score columns.
    /// Empty when there is no board.
    pub fn columns(&self) -> Columns {
        let board = self.board().unwrap_or_default();
        Columns::from_board(&board, &self.inner.options)
    }

    // -- Accessors --------------------------------------------------------

    /// The raw score waiting for login, if any.
    pub fn pending_score(&self) -> Option<i64> {
        self.inner.state.lock().pending_score
    }

    pub fn leaderboard_id(&self) -> &str {
        &self.inner.leaderboard_id
    }

    pub fn options(&self) -> &LeaderboardOptions {
        &self.inner.options
    }

    fn backend(&self) -> Result<Arc<dyn Backend>, LeaderboardError> {
        if self.inner.options.debug {
            return Ok(Arc::clone(&self.inner.sandbox));
        }
        let backend = self.inner.hub.backend()?;
        match backend.kind() {
            BackendKind::Simulated => Ok(Arc::clone(&self.inner.sandbox)),
            BackendKind::Live => Ok(backend),
        }
    }
}

impl std::fmt::Debug for LeaderboardManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("LeaderboardManager")
            .field("leaderboard_id", &self.inner.leaderboard_id)
            .field("options", &self.inner.options)
            .field("pending_score", &state.pending_score)
            .field("displayed_mode", &state.displayed_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(multiplier: f64) -> LeaderboardManager {
        let options = LeaderboardOptions {
            score_storage_multiplier: multiplier,
            ..LeaderboardOptions::default()
        };
        LeaderboardManager::new("lb", options, SessionHub::headless()).unwrap()
    }

    #[test]
    fn test_new_zero_multiplier_is_configuration_error() {
        let options = LeaderboardOptions {
            score_storage_multiplier: 0.0,
            ..LeaderboardOptions::default()
        };
        let result = LeaderboardManager::new("lb", options, SessionHub::headless());
        assert!(matches!(result, Err(LeaderboardError::Configuration(_))));
    }

    #[test]
    fn test_to_raw_rounds_scaled_score() {
        assert_eq!(manager(100.0).to_raw(12.34).unwrap(), 1234);
        assert_eq!(manager(100.0).to_raw(0.126).unwrap(), 13);
        assert_eq!(manager(1.0).to_raw(2.5).unwrap(), 3);
        assert_eq!(manager(-1.0).to_raw(7.0).unwrap(), -7);
    }

    #[test]
    fn test_to_raw_rejects_unrepresentable_scores() {
        assert!(matches!(
            manager(1.0).to_raw(f64::INFINITY),
            Err(LeaderboardError::InvalidScore(_))
        ));
        assert!(manager(1.0).to_raw(f64::NAN).is_err());
        assert!(manager(1e300).to_raw(1e300).is_err());
    }

    #[test]
    fn test_new_manager_has_no_board_and_displays_configured_mode() {
        let options = LeaderboardOptions {
            mode: Mode::AroundPlayer,
            ..LeaderboardOptions::default()
        };
        let manager = LeaderboardManager::new("lb", options, SessionHub::headless()).unwrap();

        assert_eq!(manager.displayed_mode(), Mode::AroundPlayer);
        assert!(manager.board().is_none());
        assert!(manager.columns().is_empty());
        assert_eq!(manager.pending_score(), None);
    }

    #[test]
    fn test_invalidate_clears_both_caches_and_bumps_generation() {
        let mut state = BoardState {
            world: Some(vec![]),
            around_player: Some(vec![]),
            ..BoardState::default()
        };
        state.invalidate();
        assert!(state.world.is_none());
        assert!(state.around_player.is_none());
        assert_eq!(state.generation, 1);
    }

    #[tokio::test]
    async fn test_get_leaderboard_without_session_fails() {
        let result = manager(1.0).get_leaderboard().await;
        assert!(matches!(result, Err(LeaderboardError::Session(_))));
    }
}
