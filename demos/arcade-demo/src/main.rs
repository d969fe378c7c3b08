use std::time::Duration;

use arclink::prelude::*;

// ---------------------------------------------------------------------------
// Demo config
// ---------------------------------------------------------------------------

/// Used when no config path is given: everything simulated.
const DEFAULT_CONFIG: &str = r#"{
    "debug": true,
    "gameId": "space-race",
    "leaderboards": [
        {"id": "lap-times", "scoreType": "fastestTime"},
        {"id": "high-score", "mode": "aroundPlayer", "maxRows": 5}
    ]
}"#;

fn load_config() -> Result<ArcadeConfig, ArclinkError> {
    match std::env::args().nth(1) {
        Some(path) => ArcadeConfig::from_file(path),
        None => ArcadeConfig::from_json_str(DEFAULT_CONFIG),
    }
}

// ---------------------------------------------------------------------------
// Session wiring
// ---------------------------------------------------------------------------

/// Prints every hub notification, the way a UI binding would react.
fn watch(hub: &SessionHub) {
    hub.on_login_status_changed(|logged_in| {
        tracing::info!(logged_in, "[ui] login status");
    });
    hub.on_user_updated(|user| {
        tracing::info!(name = %user.display_name, "[ui] welcome");
    });
    hub.on_balance_updated(|balance| {
        tracing::info!(balance, "[ui] coins");
    });
    hub.on_inventory_updated(|items| {
        tracing::info!(count = items.len(), "[ui] inventory");
    });
    hub.on_catalog_updated(|catalog| {
        for entry in catalog {
            tracing::info!(item = %entry.item_id, price = entry.price, "[ui] store item");
        }
    });
}

/// One play session: race, log in, shop, show the boards.
async fn play(arcade: &Arcade) -> Result<(), ArclinkError> {
    let hub = arcade.hub();
    arcade.refresh_leaderboards().await;

    // A lap time of 73.4s, submitted before the player has logged in. A
    // simulated session takes it anyway; a live one holds it until login.
    if let Some(laps) = arcade.leaderboard("lap-times") {
        let outcome = laps.submit(734.0).await?;
        tracing::info!(?outcome, "lap time submitted");
    }

    if !hub.login().await? {
        tracing::warn!("login declined; nothing more to do");
        return Ok(());
    }
    hub.get_user().await;

    let catalog = hub.refresh_catalog().await.unwrap_or_default();
    for item in &catalog {
        let outcome = hub.purchase_item(item).await?;
        tracing::info!(item = %item.item_id, ?outcome, "purchase");
    }

    if let Some(high) = arcade.leaderboard("high-score") {
        high.submit(4200.0).await?;
    }

    // Let the held lap time and background refreshes land.
    tokio::time::sleep(Duration::from_secs(3)).await;

    for board in arcade.leaderboards() {
        println!("== {} ({}) ==", board.leaderboard_id(), board.displayed_mode());
        println!("{}", board.columns());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    arclink::logging::init();

    let config = load_config()?;
    let arcade = Arcade::builder().config(config).build().await?;
    watch(arcade.hub());

    play(&arcade).await?;
    arcade.shutdown();
    Ok(())
}
