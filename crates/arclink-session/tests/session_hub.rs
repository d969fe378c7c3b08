//! Integration tests for the session hub.
//!
//! Most tests drive the hub against the simulator with paused time, so its
//! artificial delays auto-advance. Failure paths use `ScriptedBackend`,
//! whose answers are set up front.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use arclink_backend::{Backend, BackendError, BackendKind, SimulatorConfig, StatusSink};
use arclink_protocol::{
    CatalogEntry, CatalogResponse, CurrencyResponse, InventoryResponse, ItemId,
    LeaderboardQuery, LeaderboardResponse, LoginStatus, PurchaseReceipt, UserResponse,
};
use arclink_session::{
    EventKind, Host, HubConfig, HubEvent, HubState, PurchaseOutcome, SessionError, SessionHub,
};
use async_trait::async_trait;
use parking_lot::Mutex;

// =============================================================================
// Helpers
// =============================================================================

fn debug_config() -> HubConfig {
    HubConfig {
        debug_mode: true,
        game_id: "space-race".into(),
        simulator: SimulatorConfig {
            rng_seed: Some(1),
            catalog: vec![
                entry("debug", 5),
                entry("cape", 10),
                entry("golden-hat", 100),
            ],
            ..SimulatorConfig::default()
        },
    }
}

fn entry(id: &str, price: u64) -> CatalogEntry {
    CatalogEntry {
        item_id: ItemId::new(id),
        name: id.to_string(),
        price,
    }
}

/// Lets spawned refreshes run to completion.
async fn settle() {
    tokio::time::sleep(Duration::from_secs(5)).await;
}

fn record<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Arc<Mutex<Vec<T>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    (Arc::clone(&log), log)
}

#[derive(Default)]
struct RecordingHost {
    immersive: AtomicBool,
    immersive_ended: AtomicUsize,
    coin_store_opened: AtomicUsize,
}

#[async_trait]
impl Host for RecordingHost {
    fn is_immersive_session_active(&self) -> bool {
        self.immersive.load(Ordering::SeqCst)
    }

    async fn end_immersive_session(&self) {
        self.immersive.store(false, Ordering::SeqCst);
        self.immersive_ended.fetch_add(1, Ordering::SeqCst);
    }

    async fn open_coin_store(&self) {
        self.coin_store_opened.fetch_add(1, Ordering::SeqCst);
    }
}

/// A backend whose answers are fixed by the test.
struct ScriptedBackend {
    logged_in: AtomicBool,
    currency: Mutex<Result<CurrencyResponse, String>>,
    inventory: Mutex<Result<InventoryResponse, String>>,
    purchase: Mutex<Option<BackendError>>,
    sink: Mutex<Option<StatusSink>>,
}

impl ScriptedBackend {
    fn new(logged_in: bool) -> Self {
        Self {
            logged_in: AtomicBool::new(logged_in),
            currency: Mutex::new(Ok(CurrencyResponse::balance(7))),
            inventory: Mutex::new(Ok(InventoryResponse {
                inventory: Some(vec![ItemId::new("sword")]),
            })),
            purchase: Mutex::new(None),
            sink: Mutex::new(None),
        }
    }

    fn signal(&self, status: LoginStatus) {
        self.logged_in
            .store(status.is_logged_in(), Ordering::SeqCst);
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(status);
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Live
    }

    fn attach(&self, sink: StatusSink) {
        *self.sink.lock() = Some(sink);
    }

    fn detach(&self) {
        self.sink.lock().take();
    }

    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    async fn login_button_pressed(&self) -> Result<bool, BackendError> {
        Ok(false)
    }

    async fn get_amount_currency(&self) -> Result<CurrencyResponse, BackendError> {
        self.currency
            .lock()
            .clone()
            .map_err(BackendError::Rejected)
    }

    async fn get_inventory(&self) -> Result<InventoryResponse, BackendError> {
        self.inventory
            .lock()
            .clone()
            .map_err(BackendError::Rejected)
    }

    async fn get_catalog(&self, _game_id: &str) -> Result<CatalogResponse, BackendError> {
        Ok(CatalogResponse { catalog: None })
    }

    async fn purchase_item(
        &self,
        _game_id: &str,
        item_id: &ItemId,
        _price: u64,
    ) -> Result<PurchaseReceipt, BackendError> {
        match self.purchase.lock().take() {
            Some(error) => Err(error),
            None => Ok(PurchaseReceipt {
                item_id: item_id.clone(),
            }),
        }
    }

    async fn get_user(&self) -> Result<UserResponse, BackendError> {
        Ok(UserResponse { user: None })
    }

    async fn submit_score(&self, _id: &str, _raw: i64) -> Result<(), BackendError> {
        Ok(())
    }

    async fn get_leaderboard(
        &self,
        _query: &LeaderboardQuery,
    ) -> Result<LeaderboardResponse, BackendError> {
        Ok(LeaderboardResponse { leaderboard: None })
    }
}

// =============================================================================
// Initialize and login
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_login_then_get_user_fires_user_updated_once() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();

    let (users, users_cb) = record();
    hub.on_user_updated(move |user| users_cb.lock().push(user.display_name.clone()));

    assert!(hub.login().await.unwrap());
    assert_eq!(hub.state(), HubState::LoggedIn);

    let user = hub.get_user().await.unwrap();
    assert_eq!(user.display_name, "WonderfulUser");
    assert_eq!(*users.lock(), vec!["WonderfulUser".to_string()]);
    assert_eq!(hub.session().user_profile, Some(user));
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_registered_before_initialize_fire_on_login() {
    let hub = SessionHub::headless();
    let (statuses, statuses_cb) = record();
    hub.on_login_status_changed(move |logged_in| statuses_cb.lock().push(logged_in));

    hub.initialize(debug_config(), None).unwrap();
    hub.login().await.unwrap();

    assert_eq!(*statuses.lock(), vec![false, true]);
}

#[tokio::test(start_paused = true)]
async fn test_login_refreshes_inventory_and_balance_in_background() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();

    let (balances, balances_cb) = record();
    hub.on_balance_updated(move |balance| balances_cb.lock().push(balance));
    let (inventories, inventories_cb) = record();
    hub.on_inventory_updated(move |items| inventories_cb.lock().push(items.to_vec()));

    hub.login().await.unwrap();
    settle().await;

    assert_eq!(*balances.lock(), vec![42]);
    assert_eq!(*inventories.lock(), vec![vec![ItemId::new("debug")]]);
    let session = hub.session();
    assert_eq!(session.currency_balance, 42);
    assert_eq!(session.inventory, vec![ItemId::new("debug")]);
}

#[tokio::test(start_paused = true)]
async fn test_login_ends_immersive_session_first() {
    let host = Arc::new(RecordingHost::default());
    host.immersive.store(true, Ordering::SeqCst);
    let hub = SessionHub::new(host.clone());
    hub.initialize(debug_config(), None).unwrap();

    hub.login().await.unwrap();

    assert_eq!(host.immersive_ended.load(Ordering::SeqCst), 1);
    assert!(!host.is_immersive_session_active());
}

#[tokio::test]
async fn test_login_before_initialize_fails() {
    let hub = SessionHub::headless();
    assert!(matches!(hub.login().await, Err(SessionError::NotInitialized)));
}

#[tokio::test(start_paused = true)]
async fn test_initialize_adopts_logged_in_gateway() {
    let hub = SessionHub::headless();
    let (statuses, statuses_cb) = record();
    hub.on_login_status_changed(move |logged_in| statuses_cb.lock().push(logged_in));

    let kind = hub
        .initialize(
            HubConfig {
                game_id: "g".into(),
                ..HubConfig::default()
            },
            Some(Arc::new(ScriptedBackend::new(true))),
        )
        .unwrap();
    settle().await;

    assert_eq!(kind, BackendKind::Live);
    assert_eq!(hub.state(), HubState::LoggedIn);
    assert_eq!(*statuses.lock(), vec![true]);
    assert_eq!(hub.session().currency_balance, 7);
}

#[tokio::test(start_paused = true)]
async fn test_gateway_is_used_even_in_debug_mode() {
    let hub = SessionHub::headless();
    let kind = hub
        .initialize(debug_config(), Some(Arc::new(ScriptedBackend::new(false))))
        .unwrap();

    assert_eq!(kind, BackendKind::Live);
    assert_eq!(hub.state(), HubState::LoggedOut);
}

#[tokio::test(start_paused = true)]
async fn test_status_signal_drives_state() {
    let backend = Arc::new(ScriptedBackend::new(false));
    let hub = SessionHub::headless();
    hub.initialize(HubConfig::default(), Some(backend.clone()))
        .unwrap();

    backend.signal(LoginStatus::LoggedIn);
    assert_eq!(hub.state(), HubState::LoggedIn);

    backend.signal(LoginStatus::LoggedOut);
    assert_eq!(hub.state(), HubState::LoggedOut);
}

#[tokio::test(start_paused = true)]
async fn test_reinitialize_ignores_replaced_backend() {
    let first = Arc::new(ScriptedBackend::new(false));
    let hub = SessionHub::headless();
    hub.initialize(HubConfig::default(), Some(first.clone()))
        .unwrap();
    hub.initialize(HubConfig::default(), Some(Arc::new(ScriptedBackend::new(false))))
        .unwrap();

    let (statuses, statuses_cb) = record();
    hub.on_login_status_changed(move |logged_in| statuses_cb.lock().push(logged_in));
    first.signal(LoginStatus::LoggedIn);

    assert!(statuses.lock().is_empty());
    assert_eq!(hub.state(), HubState::LoggedOut);
}

#[tokio::test(start_paused = true)]
async fn test_reinitialize_keeps_subscribers_and_resets_session() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();
    hub.login().await.unwrap();
    settle().await;
    assert_eq!(hub.session().currency_balance, 42);

    let (statuses, statuses_cb) = record();
    hub.on_login_status_changed(move |logged_in| statuses_cb.lock().push(logged_in));
    hub.initialize(debug_config(), None).unwrap();

    assert_eq!(hub.session().currency_balance, 0);
    assert_eq!(hub.state(), HubState::LoggedOut);
    assert_eq!(*statuses.lock(), vec![false]);
}

// =============================================================================
// Refreshes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_refresh_catalog_fires_catalog_then_refreshes_inventory() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();
    hub.login().await.unwrap();
    settle().await;

    let (catalogs, catalogs_cb) = record();
    hub.on_catalog_updated(move |catalog| catalogs_cb.lock().push(catalog.len()));
    let (inventories, inventories_cb) = record();
    hub.on_inventory_updated(move |items| inventories_cb.lock().push(items.len()));

    let catalog = hub.refresh_catalog().await.unwrap();
    settle().await;

    assert_eq!(catalog.len(), 3);
    assert_eq!(*catalogs.lock(), vec![3]);
    assert_eq!(*inventories.lock(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_catalog_logged_out_skips_inventory() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();

    let (inventories, inventories_cb) = record();
    hub.on_inventory_updated(move |items| inventories_cb.lock().push(items.len()));

    hub.refresh_catalog().await.unwrap();
    settle().await;

    assert!(inventories.lock().is_empty());
    assert_eq!(hub.session().catalog.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_balance_with_error_field_keeps_old_value() {
    let backend = Arc::new(ScriptedBackend::new(false));
    let hub = SessionHub::headless();
    hub.initialize(HubConfig::default(), Some(backend.clone()))
        .unwrap();
    assert_eq!(hub.refresh_balance().await, Some(7));

    *backend.currency.lock() = Ok(CurrencyResponse {
        currency: None,
        error: Some("service down".into()),
    });
    let (balances, balances_cb) = record();
    hub.on_balance_updated(move |balance| balances_cb.lock().push(balance));

    assert_eq!(hub.refresh_balance().await, None);
    assert!(balances.lock().is_empty());
    assert_eq!(hub.session().currency_balance, 7);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_balance_failure_is_silent() {
    let backend = Arc::new(ScriptedBackend::new(false));
    *backend.currency.lock() = Err("boom".into());
    let hub = SessionHub::headless();
    hub.initialize(HubConfig::default(), Some(backend)).unwrap();

    assert_eq!(hub.refresh_balance().await, None);
    assert_eq!(hub.session().currency_balance, 0);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_inventory_failure_empties_inventory_without_notifying() {
    let backend = Arc::new(ScriptedBackend::new(false));
    let hub = SessionHub::headless();
    hub.initialize(HubConfig::default(), Some(backend.clone()))
        .unwrap();
    hub.refresh_inventory().await.unwrap();
    assert_eq!(hub.session().inventory, vec![ItemId::new("sword")]);

    *backend.inventory.lock() = Err("boom".into());
    let (inventories, inventories_cb) = record();
    hub.on_inventory_updated(move |items| inventories_cb.lock().push(items.len()));

    assert_eq!(hub.refresh_inventory().await, None);
    assert!(inventories.lock().is_empty());
    assert!(hub.session().inventory.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_get_user_without_profile_does_not_notify() {
    let hub = SessionHub::headless();
    hub.initialize(HubConfig::default(), Some(Arc::new(ScriptedBackend::new(true))))
        .unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let fired_cb = Arc::clone(&fired);
    hub.on_user_updated(move |_| {
        fired_cb.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(hub.refresh_user().await, None);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_before_initialize_returns_none() {
    let hub = SessionHub::headless();
    assert_eq!(hub.refresh_balance().await, None);
    assert_eq!(hub.refresh_inventory().await, None);
    assert_eq!(hub.refresh_catalog().await, None);
    assert_eq!(hub.get_user().await, None);
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_purchase_logged_out_requests_login() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();

    let outcome = hub.purchase_item(&entry("cape", 10)).await.unwrap();
    settle().await;

    assert_eq!(outcome, PurchaseOutcome::LoginRequested);
    assert_eq!(hub.state(), HubState::LoggedIn);
    assert!(!hub.session().purchase_in_flight);
}

#[tokio::test(start_paused = true)]
async fn test_purchase_denied_login_clears_flag() {
    let hub = SessionHub::headless();
    hub.initialize(HubConfig::default(), Some(Arc::new(ScriptedBackend::new(false))))
        .unwrap();

    let outcome = hub.purchase_item(&entry("cape", 10)).await.unwrap();

    assert_eq!(outcome, PurchaseOutcome::LoginRequested);
    assert!(!hub.session().purchase_in_flight);
}

#[tokio::test(start_paused = true)]
async fn test_purchase_success_refreshes_inventory() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();
    hub.login().await.unwrap();
    settle().await;

    let outcome = hub.purchase_item(&entry("cape", 10)).await.unwrap();

    assert_eq!(
        outcome,
        PurchaseOutcome::Purchased(PurchaseReceipt {
            item_id: ItemId::new("cape")
        })
    );
    let session = hub.session();
    assert!(session.inventory.contains(&ItemId::new("cape")));
    assert!(!session.purchase_in_flight);
    assert_eq!(hub.refresh_balance().await, Some(32));
}

#[tokio::test(start_paused = true)]
async fn test_purchase_owned_item_is_rejected_locally() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();
    hub.login().await.unwrap();
    settle().await;

    let outcome = hub.purchase_item(&entry("debug", 5)).await.unwrap();

    assert_eq!(outcome, PurchaseOutcome::AlreadyOwned);
    assert!(!hub.session().purchase_in_flight);
}

#[tokio::test(start_paused = true)]
async fn test_second_purchase_while_in_flight_is_busy() {
    let hub = SessionHub::headless();
    hub.initialize(debug_config(), None).unwrap();
    hub.login().await.unwrap();
    settle().await;

    let cape = entry("cape", 10);
    let (first, second) = tokio::join!(hub.purchase_item(&cape), hub.purchase_item(&cape));

    assert!(matches!(first.unwrap(), PurchaseOutcome::Purchased(_)));
    assert_eq!(second.unwrap(), PurchaseOutcome::Busy);
}

#[tokio::test(start_paused = true)]
async fn test_purchase_insufficient_funds_opens_coin_store_then_refreshes_balance() {
    let host = Arc::new(RecordingHost::default());
    let hub = SessionHub::new(host.clone());
    hub.initialize(debug_config(), None).unwrap();
    hub.login().await.unwrap();
    settle().await;

    let (balances, balances_cb) = record();
    hub.on_balance_updated(move |balance| balances_cb.lock().push(balance));

    let outcome = hub.purchase_item(&entry("golden-hat", 100)).await.unwrap();
    settle().await;

    assert_eq!(outcome, PurchaseOutcome::CoinStoreOpened);
    assert_eq!(host.coin_store_opened.load(Ordering::SeqCst), 1);
    assert_eq!(*balances.lock(), vec![42]);
    assert!(!hub.session().purchase_in_flight);
}

#[tokio::test(start_paused = true)]
async fn test_purchase_other_rejection_is_returned() {
    let backend = Arc::new(ScriptedBackend::new(true));
    *backend.purchase.lock() = Some(BackendError::Rejected("region locked".into()));
    let hub = SessionHub::headless();
    hub.initialize(HubConfig::default(), Some(backend)).unwrap();

    let result = hub.purchase_item(&entry("cape", 10)).await;

    assert!(matches!(
        result,
        Err(SessionError::Backend(BackendError::Rejected(_)))
    ));
    assert!(!hub.session().purchase_in_flight);
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_unsubscribed_callback_stops_firing() {
    let hub = SessionHub::headless();
    let (events, events_cb) = record();
    let subscription = hub.subscribe(EventKind::LoginStatusChanged, move |event| {
        events_cb.lock().push(event.clone());
    });

    hub.initialize(debug_config(), None).unwrap();
    assert!(hub.unsubscribe(subscription));
    hub.login().await.unwrap();

    assert_eq!(*events.lock(), vec![HubEvent::LoginStatusChanged(false)]);
    assert_eq!(hub.subscriber_count(EventKind::LoginStatusChanged), 0);
}
