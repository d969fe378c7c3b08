//! The session hub: login state, cached arcade data, and notifications.
//!
//! One hub exists per running game. It is an explicit context object:
//! construct it, [`initialize`](SessionHub::initialize) it with a backend,
//! and hand clones of it to whatever needs session state (leaderboards,
//! UI bindings). Clones share the same state.
//!
//! ## Login state machine
//!
//! ```text
//!                 initialize()            status signal: connected
//! [Uninitialized] ───────────→ [LoggedOut] ─────────────────────→ [LoggedIn]
//!        ↑                          ↑                                 │
//!        └──── teardown() ──────────┴──── status signal: none ────────┘
//! ```
//!
//! Status only changes when the backend's status signal fires. Logging in
//! through [`login`](SessionHub::login) opens the prompt; the transition
//! itself still arrives through the signal.
//!
//! ## Failure policy
//!
//! Refreshes never fail the caller. A failed fetch leaves the cached value
//! untouched and fires no notification, with one exception: a failed
//! inventory fetch empties the cached inventory and clears the in-flight
//! purchase flag.

use std::sync::{Arc, Weak};

use arclink_backend::{Backend, BackendError, BackendKind, Simulator, SimulatorConfig, StatusSink};
use arclink_protocol::{
    CatalogEntry, CatalogResponse, InventoryResponse, ItemId, LoginStatus, PurchaseReceipt,
    UserProfile,
};
use parking_lot::Mutex;

use crate::{EventKind, EventRegistry, HeadlessHost, Host, HubEvent, SessionError, Subscription};

// ---------------------------------------------------------------------------
// HubConfig
// ---------------------------------------------------------------------------

/// Settings passed to [`SessionHub::initialize`].
#[derive(Debug, Clone, Default)]
pub struct HubConfig {
    /// Use the simulator when no live gateway is available.
    pub debug_mode: bool,

    /// The arcade's id for this game; sent with catalog reads and purchases.
    pub game_id: String,

    /// Tunables for the simulator, used only in simulated mode.
    pub simulator: SimulatorConfig,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Snapshot of everything the hub knows about the current user.
///
/// Returned by value from [`SessionHub::session`]. Reading fields from a
/// snapshot is not synchronized with notifications; subscribe to be told
/// about changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub status: LoginStatus,
    pub game_id: String,
    pub debug_mode: bool,
    pub inventory: Vec<ItemId>,
    pub catalog: Vec<CatalogEntry>,
    pub currency_balance: i64,
    pub user_profile: Option<UserProfile>,
    pub purchase_in_flight: bool,
}

impl Session {
    fn new(config: &HubConfig) -> Self {
        Self {
            game_id: config.game_id.clone(),
            debug_mode: config.debug_mode,
            ..Self::default()
        }
    }
}

/// Where the hub is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    Uninitialized,
    LoggedOut,
    LoggedIn,
}

/// What [`SessionHub::purchase_item`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    /// Another purchase is still in flight; nothing was done.
    Busy,
    /// The user wasn't logged in, so the login prompt was opened instead.
    LoginRequested,
    /// The item is already in the inventory.
    AlreadyOwned,
    /// The backend unlocked the item; the inventory has been refreshed.
    Purchased(PurchaseReceipt),
    /// The user couldn't afford the item; the coin store was opened.
    CoinStoreOpened,
}

// ---------------------------------------------------------------------------
// SessionHub
// ---------------------------------------------------------------------------

/// Tracks login status and cached arcade data, and notifies subscribers
/// when either changes.
///
/// Cheap to clone; every clone is the same hub.
#[derive(Clone)]
pub struct SessionHub {
    inner: Arc<HubInner>,
}

struct HubInner {
    host: Arc<dyn Host>,
    events: EventRegistry,
    shared: Mutex<Shared>,
}

struct Shared {
    /// `None` until initialized.
    backend: Option<Arc<dyn Backend>>,
    /// Bumped on every initialize/teardown. Status signals and fetches
    /// carry the generation they started in and are dropped if it moved on.
    generation: u64,
    session: Session,
}

impl SessionHub {
    /// Creates an uninitialized hub running inside `host`.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            inner: Arc::new(HubInner {
                host,
                events: EventRegistry::new(),
                shared: Mutex::new(Shared {
                    backend: None,
                    generation: 0,
                    session: Session::default(),
                }),
            }),
        }
    }

    /// Creates an uninitialized hub with a [`HeadlessHost`].
    pub fn headless() -> Self {
        Self::new(Arc::new(HeadlessHost))
    }

    // -- Lifecycle --------------------------------------------------------

    /// Resets the session and connects the hub to a backend.
    ///
    /// - With a `gateway`, the hub uses it and listens to its status
    ///   signal. If the gateway already reports a logged-in user, the hub
    ///   adopts that status immediately.
    /// - Without one and with `config.debug_mode`, the hub builds a
    ///   [`Simulator`], forces the status to logged out, and fires
    ///   `LoginStatusChanged(false)` before returning.
    /// - Without either, the session is reset and
    ///   [`SessionError::GatewayUnavailable`] is returned.
    ///
    /// Calling it again replaces the previous backend and session state.
    /// Subscribers are kept.
    pub fn initialize(
        &self,
        config: HubConfig,
        gateway: Option<Arc<dyn Backend>>,
    ) -> Result<BackendKind, SessionError> {
        let (backend, announce_logged_out) = match gateway {
            Some(gateway) => (gateway, false),
            None if config.debug_mode => {
                let simulator: Arc<dyn Backend> =
                    Arc::new(Simulator::new(config.simulator.clone()));
                (simulator, true)
            }
            None => {
                self.reset(Session::new(&config));
                tracing::warn!("no arcade gateway and debug mode is off");
                return Err(SessionError::GatewayUnavailable);
            }
        };

        let (previous, generation) = {
            let mut shared = self.inner.shared.lock();
            shared.generation += 1;
            shared.session = Session::new(&config);
            let previous = shared.backend.replace(Arc::clone(&backend));
            (previous, shared.generation)
        };
        if let Some(previous) = previous {
            previous.detach();
        }
        backend.attach(self.status_sink(generation));

        let kind = backend.kind();
        tracing::info!(
            backend = %kind,
            game_id = %config.game_id,
            debug = config.debug_mode,
            "session hub initialized"
        );

        if announce_logged_out {
            self.on_status_changed(LoginStatus::LoggedOut);
        } else if backend.is_logged_in() {
            self.on_status_changed(LoginStatus::LoggedIn);
        }
        Ok(kind)
    }

    /// Disconnects from the backend and returns to `Uninitialized`.
    pub fn teardown(&self) {
        self.reset(Session::default());
        tracing::info!("session hub torn down");
    }

    fn reset(&self, session: Session) {
        let previous = {
            let mut shared = self.inner.shared.lock();
            shared.generation += 1;
            shared.session = session;
            shared.backend.take()
        };
        if let Some(previous) = previous {
            previous.detach();
        }
    }

    fn status_sink(&self, generation: u64) -> StatusSink {
        let weak: Weak<HubInner> = Arc::downgrade(&self.inner);
        Arc::new(move |status| {
            if let Some(inner) = weak.upgrade() {
                let hub = SessionHub { inner };
                if hub.generation() == generation {
                    hub.on_status_changed(status);
                } else {
                    tracing::debug!(%status, "ignoring status from a replaced backend");
                }
            }
        })
    }

    // -- Status -----------------------------------------------------------

    /// Applies a login-status signal.
    ///
    /// Fires `LoginStatusChanged` to every subscriber. On `LoggedIn`, then
    /// starts an inventory refresh and a balance refresh in the background;
    /// their failures don't affect the transition. On `LoggedOut`, cached
    /// data is left as it was.
    pub fn on_status_changed(&self, status: LoginStatus) {
        {
            let mut shared = self.inner.shared.lock();
            if shared.backend.is_none() {
                tracing::warn!(%status, "status change before initialize; ignored");
                return;
            }
            shared.session.status = status;
        }
        tracing::info!(%status, "login status changed");

        self.inner
            .events
            .dispatch(&HubEvent::LoginStatusChanged(status.is_logged_in()));

        if status.is_logged_in() {
            let hub = self.clone();
            self.spawn_detached("inventory refresh", async move {
                hub.refresh_inventory().await;
            });
            let hub = self.clone();
            self.spawn_detached("balance refresh", async move {
                hub.refresh_balance().await;
            });
        }
    }

    fn spawn_detached<F>(&self, what: &'static str, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(_) => tracing::warn!(what, "no async runtime; skipping background task"),
        }
    }

    // -- Refreshes --------------------------------------------------------

    /// Fetches the coin balance. Fires `BalanceUpdated` on success.
    ///
    /// Returns the new balance, or `None` if the fetch failed or the
    /// backend answered with an error.
    pub async fn refresh_balance(&self) -> Option<i64> {
        let (backend, generation) = self.active()?;
        let response = match backend.get_amount_currency().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "balance fetch failed");
                return None;
            }
        };

        let balance = match (response.error, response.currency) {
            (Some(error), _) => {
                tracing::warn!(%error, "balance fetch returned an error");
                return None;
            }
            (None, None) => {
                tracing::warn!("balance response has no currency field");
                return None;
            }
            (None, Some(balance)) => balance,
        };

        if !self.update(generation, |session| session.currency_balance = balance) {
            return None;
        }
        tracing::debug!(balance, "balance updated");
        self.inner.events.dispatch(&HubEvent::BalanceUpdated(balance));
        Some(balance)
    }

    /// Fetches the inventory. Fires `InventoryUpdated` on success.
    ///
    /// Either way the in-flight purchase flag is cleared. On failure the
    /// cached inventory is emptied and no notification fires.
    pub async fn refresh_inventory(&self) -> Option<Vec<ItemId>> {
        let (backend, generation) = self.active()?;
        let items = match backend.get_inventory().await {
            Ok(InventoryResponse {
                inventory: Some(items),
            }) => Some(items),
            Ok(_) => {
                tracing::warn!("inventory response has no inventory field");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "inventory fetch failed");
                None
            }
        };

        let applied = self.update(generation, |session| {
            session.purchase_in_flight = false;
            session.inventory = items.clone().unwrap_or_default();
        });
        let items = items.filter(|_| applied)?;

        tracing::debug!(count = items.len(), "inventory updated");
        self.inner
            .events
            .dispatch(&HubEvent::InventoryUpdated(items.clone()));
        Some(items)
    }

    /// Fetches the store catalog for this game. Fires `CatalogUpdated` on
    /// success and, when the user is logged in, starts an inventory refresh
    /// so ownership is current.
    pub async fn refresh_catalog(&self) -> Option<Vec<CatalogEntry>> {
        let (backend, generation) = self.active()?;
        let game_id = self.game_id();
        let catalog = match backend.get_catalog(&game_id).await {
            Ok(CatalogResponse {
                catalog: Some(catalog),
            }) => catalog,
            Ok(_) => {
                tracing::warn!("catalog response has no catalog field");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog fetch failed");
                return None;
            }
        };

        if !self.update(generation, |session| session.catalog = catalog.clone()) {
            return None;
        }
        tracing::debug!(count = catalog.len(), "catalog updated");
        self.inner
            .events
            .dispatch(&HubEvent::CatalogUpdated(catalog.clone()));

        if backend.is_logged_in() {
            let hub = self.clone();
            self.spawn_detached("inventory refresh", async move {
                hub.refresh_inventory().await;
            });
        }
        Some(catalog)
    }

    /// Fetches the user's profile. Fires `UserUpdated` only when the
    /// response actually contains a profile.
    pub async fn get_user(&self) -> Option<UserProfile> {
        let (backend, generation) = self.active()?;
        let user = match backend.get_user().await {
            Ok(response) => response.user,
            Err(e) => {
                tracing::warn!(error = %e, "user fetch failed");
                return None;
            }
        };
        let Some(user) = user else {
            tracing::debug!("user response without a profile");
            return None;
        };

        if !self.update(generation, |session| session.user_profile = Some(user.clone())) {
            return None;
        }
        tracing::debug!(display_name = %user.display_name, "user updated");
        self.inner.events.dispatch(&HubEvent::UserUpdated(user.clone()));
        Some(user)
    }

    /// Same as [`get_user`](Self::get_user).
    pub async fn refresh_user(&self) -> Option<UserProfile> {
        self.get_user().await
    }

    // -- Login and purchases ----------------------------------------------

    /// Opens the login prompt, ending any immersive session first.
    ///
    /// Resolves with whether the backend granted the login. The status
    /// transition and its notifications arrive through the status signal;
    /// the simulator emits it before this resolves.
    pub async fn login(&self) -> Result<bool, SessionError> {
        let (backend, _) = self.active().ok_or(SessionError::NotInitialized)?;

        let host = &self.inner.host;
        if host.is_immersive_session_active() {
            tracing::debug!("ending immersive session for login prompt");
            host.end_immersive_session().await;
        }

        let granted = backend.login_button_pressed().await?;
        tracing::info!(granted, "login prompt resolved");
        Ok(granted)
    }

    /// Buys `item` from the catalog.
    ///
    /// Only one purchase runs at a time; a call while another is in flight
    /// returns [`PurchaseOutcome::Busy`]. A logged-out user gets the login
    /// prompt instead of a purchase. An unaffordable item opens the coin
    /// store. Any other rejection is returned as an error.
    pub async fn purchase_item(
        &self,
        item: &CatalogEntry,
    ) -> Result<PurchaseOutcome, SessionError> {
        let (backend, generation) = self.active().ok_or(SessionError::NotInitialized)?;

        let game_id = {
            let mut shared = self.inner.shared.lock();
            let session = &mut shared.session;
            if session.purchase_in_flight {
                return Ok(PurchaseOutcome::Busy);
            }
            if session.inventory.contains(&item.item_id) {
                return Ok(PurchaseOutcome::AlreadyOwned);
            }
            session.purchase_in_flight = true;
            session.game_id.clone()
        };

        if !backend.is_logged_in() {
            tracing::info!(item = %item.item_id, "purchase needs login");
            // A granted login clears the flag through the inventory refresh
            // that follows the status change.
            match self.login().await {
                Ok(true) => {}
                Ok(false) => self.clear_purchase_flag(generation),
                Err(e) => {
                    tracing::warn!(error = %e, "login for purchase failed");
                    self.clear_purchase_flag(generation);
                }
            }
            return Ok(PurchaseOutcome::LoginRequested);
        }

        match backend
            .purchase_item(&game_id, &item.item_id, item.price)
            .await
        {
            Ok(receipt) => {
                tracing::info!(item = %receipt.item_id, price = item.price, "item purchased");
                self.refresh_inventory().await;
                Ok(PurchaseOutcome::Purchased(receipt))
            }
            Err(BackendError::InsufficientFunds) => {
                tracing::info!(item = %item.item_id, price = item.price, "not enough funds");
                self.clear_purchase_flag(generation);
                self.open_coin_store();
                Ok(PurchaseOutcome::CoinStoreOpened)
            }
            Err(e) => {
                tracing::warn!(item = %item.item_id, error = %e, "purchase failed");
                self.clear_purchase_flag(generation);
                Err(e.into())
            }
        }
    }

    /// Opens the coin store in the background. When the user closes it,
    /// the balance is refreshed once.
    pub fn open_coin_store(&self) {
        let hub = self.clone();
        self.spawn_detached("coin store", async move {
            let host = Arc::clone(&hub.inner.host);
            if host.is_immersive_session_active() {
                host.end_immersive_session().await;
            }
            host.open_coin_store().await;
            tracing::debug!("coin store closed");
            hub.refresh_balance().await;
        });
    }

    fn clear_purchase_flag(&self, generation: u64) {
        self.update(generation, |session| session.purchase_in_flight = false);
    }

    // -- Subscriptions ----------------------------------------------------

    /// Registers a raw subscriber for `kind`.
    pub fn subscribe(
        &self,
        kind: EventKind,
        subscriber: impl Fn(&HubEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.events.subscribe(kind, subscriber)
    }

    /// Removes a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.inner.events.unsubscribe(subscription)
    }

    /// Called with `true` on login and `false` on logout.
    pub fn on_login_status_changed(
        &self,
        f: impl Fn(bool) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::LoginStatusChanged, move |event| {
            if let HubEvent::LoginStatusChanged(logged_in) = event {
                f(*logged_in);
            }
        })
    }

    pub fn on_user_updated(
        &self,
        f: impl Fn(&UserProfile) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::UserUpdated, move |event| {
            if let HubEvent::UserUpdated(user) = event {
                f(user);
            }
        })
    }

    pub fn on_inventory_updated(
        &self,
        f: impl Fn(&[ItemId]) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::InventoryUpdated, move |event| {
            if let HubEvent::InventoryUpdated(items) = event {
                f(items);
            }
        })
    }

    pub fn on_balance_updated(&self, f: impl Fn(i64) + Send + Sync + 'static) -> Subscription {
        self.subscribe(EventKind::BalanceUpdated, move |event| {
            if let HubEvent::BalanceUpdated(balance) = event {
                f(*balance);
            }
        })
    }

    pub fn on_catalog_updated(
        &self,
        f: impl Fn(&[CatalogEntry]) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::CatalogUpdated, move |event| {
            if let HubEvent::CatalogUpdated(catalog) = event {
                f(catalog);
            }
        })
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner.events.subscriber_count(kind)
    }

    // -- Accessors --------------------------------------------------------

    pub fn state(&self) -> HubState {
        let shared = self.inner.shared.lock();
        match (&shared.backend, shared.session.status) {
            (None, _) => HubState::Uninitialized,
            (Some(_), LoginStatus::LoggedOut) => HubState::LoggedOut,
            (Some(_), LoginStatus::LoggedIn) => HubState::LoggedIn,
        }
    }

    pub fn status(&self) -> LoginStatus {
        self.inner.shared.lock().session.status
    }

    pub fn is_logged_in(&self) -> bool {
        self.status().is_logged_in()
    }

    /// A copy of the current session.
    pub fn session(&self) -> Session {
        self.inner.shared.lock().session.clone()
    }

    pub fn game_id(&self) -> String {
        self.inner.shared.lock().session.game_id.clone()
    }

    /// The backend the hub is connected to.
    pub fn backend(&self) -> Result<Arc<dyn Backend>, SessionError> {
        self.inner
            .shared
            .lock()
            .backend
            .clone()
            .ok_or(SessionError::NotInitialized)
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.inner.shared.lock().backend.as_ref().map(|b| b.kind())
    }

    fn generation(&self) -> u64 {
        self.inner.shared.lock().generation
    }

    fn active(&self) -> Option<(Arc<dyn Backend>, u64)> {
        let shared = self.inner.shared.lock();
        match &shared.backend {
            Some(backend) => Some((Arc::clone(backend), shared.generation)),
            None => {
                tracing::warn!("session hub used before initialize");
                None
            }
        }
    }

    /// Applies `f` to the session unless the hub was re-initialized since
    /// `generation`. Returns whether it was applied.
    fn update(&self, generation: u64, f: impl FnOnce(&mut Session)) -> bool {
        let mut shared = self.inner.shared.lock();
        if shared.generation != generation {
            tracing::debug!("dropping result from a previous session");
            return false;
        }
        f(&mut shared.session);
        true
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::headless()
    }
}

impl std::fmt::Debug for SessionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.inner.shared.lock();
        f.debug_struct("SessionHub")
            .field("backend", &shared.backend.as_ref().map(|b| b.kind()))
            .field("generation", &shared.generation)
            .field("session", &shared.session)
            .finish()
    }
}
