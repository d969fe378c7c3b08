//! Integration tests for the offline simulator.
//!
//! Time is paused (`start_paused = true`), so the artificial delays
//! auto-advance and the tests run instantly while still asserting on how
//! long each call "took".

use std::sync::Arc;
use std::time::Duration;

use arclink_backend::{Backend, BackendError, BackendKind, Simulator, SimulatorConfig};
use arclink_protocol::{ItemId, LeaderboardQuery, LoginStatus};
use parking_lot::Mutex;
use tokio::time::Instant;

fn simulator() -> Simulator {
    Simulator::new(SimulatorConfig {
        rng_seed: Some(42),
        ..SimulatorConfig::default()
    })
}

#[tokio::test(start_paused = true)]
async fn test_login_button_pressed_waits_then_emits_logged_in() {
    let sim = simulator();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    sim.attach(Arc::new(move |status| sink_seen.lock().push(status)));

    let start = Instant::now();
    let granted = sim.login_button_pressed().await.unwrap();

    assert!(granted);
    assert!(start.elapsed() >= Duration::from_millis(1000));
    assert!(sim.is_logged_in());
    assert_eq!(*seen.lock(), vec![LoginStatus::LoggedIn]);
}

#[tokio::test(start_paused = true)]
async fn test_detach_stops_status_delivery() {
    let sim = simulator();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    sim.attach(Arc::new(move |status| sink_seen.lock().push(status)));
    sim.detach();

    sim.login_button_pressed().await.unwrap();
    sim.logout();

    assert!(seen.lock().is_empty());
    assert!(!sim.is_logged_in());
}

#[tokio::test(start_paused = true)]
async fn test_reads_return_fabricated_shapes() {
    let sim = simulator();
    assert_eq!(sim.kind(), BackendKind::Simulated);

    let currency = sim.get_amount_currency().await.unwrap();
    assert_eq!(currency.currency, Some(42));
    assert!(currency.error.is_none());

    let inventory = sim.get_inventory().await.unwrap();
    assert_eq!(inventory.inventory, Some(vec![ItemId::new("debug")]));

    let user = sim.get_user().await.unwrap();
    assert_eq!(user.user.unwrap().display_name, "WonderfulUser");

    let catalog = sim.get_catalog("game").await.unwrap();
    assert_eq!(catalog.catalog.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_purchase_requires_login() {
    let sim = simulator();
    let result = sim.purchase_item("game", &ItemId::new("debug"), 5).await;
    assert!(matches!(result, Err(BackendError::Rejected(_))));
}

#[tokio::test(start_paused = true)]
async fn test_purchase_deducts_balance_and_unlocks_item() {
    let sim = simulator();
    sim.login_button_pressed().await.unwrap();

    let receipt = sim
        .purchase_item("game", &ItemId::new("sword"), 40)
        .await
        .unwrap();

    assert_eq!(receipt.item_id, ItemId::new("sword"));
    assert_eq!(sim.balance(), 2);
    let inventory = sim.get_inventory().await.unwrap().inventory.unwrap();
    assert!(inventory.contains(&ItemId::new("sword")));
}

#[tokio::test(start_paused = true)]
async fn test_purchase_over_balance_is_insufficient_funds() {
    let sim = simulator();
    sim.login_button_pressed().await.unwrap();

    let result = sim
        .purchase_item("game", &ItemId::new("golden-hat"), 100)
        .await;

    assert!(matches!(result, Err(BackendError::InsufficientFunds)));
    assert_eq!(sim.balance(), 42, "failed purchase must not charge");

    sim.grant_coins(100);
    assert!(sim.purchase_item("game", &ItemId::new("golden-hat"), 100).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_get_leaderboard_returns_max_rows_plus_two() {
    let sim = simulator();
    let query = LeaderboardQuery {
        leaderboard_id: "lb".into(),
        ascending: false,
        around_player: true,
        max_rows: 8,
    };

    let board = sim.get_leaderboard(&query).await.unwrap().leaderboard.unwrap();

    assert_eq!(board.len(), 10);
    assert_eq!(board[0].rank, 12);
}

#[tokio::test(start_paused = true)]
async fn test_submit_score_waits_submit_delay() {
    let sim = simulator();
    let start = Instant::now();
    sim.submit_score("lb", 500).await.unwrap();
    assert!(start.elapsed() >= sim.config().submit_delay);
}
