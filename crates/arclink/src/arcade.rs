//! `Arcade` builder: one call from config to a running session.
//!
//! This is the usual entry point. It ties the layers together:
//! gateway (or simulator) → session hub → leaderboards.

use std::collections::HashMap;
use std::sync::Arc;

use arclink_backend::{Backend, BackendKind, LiveGateway};
use arclink_leaderboard::LeaderboardManager;
use arclink_session::{HeadlessHost, Host, SessionHub};

use crate::{ArcadeConfig, ArclinkError};

/// Builder for an [`Arcade`].
///
/// # Example
///
/// ```rust,ignore
/// use arclink::prelude::*;
///
/// let arcade = Arcade::builder()
///     .config(ArcadeConfig::from_file("arcade.json")?)
///     .host(my_host)
///     .build()
///     .await?;
/// ```
pub struct ArcadeBuilder {
    config: ArcadeConfig,
    host: Arc<dyn Host>,
    gateway: Option<Arc<dyn Backend>>,
}

impl ArcadeBuilder {
    /// Creates a builder with the default config and a headless host.
    pub fn new() -> Self {
        Self {
            config: ArcadeConfig::default(),
            host: Arc::new(HeadlessHost),
            gateway: None,
        }
    }

    pub fn config(mut self, config: ArcadeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(mut self, host: impl Host) -> Self {
        self.host = Arc::new(host);
        self
    }

    /// Uses `gateway` instead of connecting to `config.gateway_url`.
    pub fn gateway(mut self, gateway: Arc<dyn Backend>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Connects (if a gateway URL is configured), initializes the session
    /// hub, and creates one manager per configured leaderboard.
    ///
    /// With `debug` set, a gateway that cannot be reached is logged and the
    /// session runs simulated instead.
    ///
    /// No leaderboard is fetched yet; see [`Arcade::refresh_leaderboards`].
    pub async fn build(self) -> Result<Arcade, ArclinkError> {
        let Self {
            config,
            host,
            gateway,
        } = self;

        let gateway = match (gateway, &config.gateway_url) {
            (Some(gateway), _) => Some(gateway),
            (None, Some(url)) => match LiveGateway::connect(url).await {
                Ok(live) => Some(Arc::new(live) as Arc<dyn Backend>),
                Err(e) if config.debug => {
                    tracing::warn!(%url, error = %e, "gateway unreachable; falling back to the simulator");
                    None
                }
                Err(e) => return Err(e.into()),
            },
            (None, None) => None,
        };

        let hub = SessionHub::new(host);
        let kind = hub.initialize(config.hub_config(), gateway)?;

        let mut leaderboards = HashMap::new();
        for binding in &config.leaderboards {
            let manager =
                LeaderboardManager::new(binding.id.clone(), binding.options(), hub.clone())?;
            leaderboards.insert(binding.id.clone(), manager);
        }

        tracing::info!(
            backend = %kind,
            game_id = %config.game_id,
            leaderboards = leaderboards.len(),
            "arcade ready"
        );
        Ok(Arcade {
            hub,
            kind,
            leaderboards,
        })
    }
}

impl Default for ArcadeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running arcade session and its leaderboards.
pub struct Arcade {
    hub: SessionHub,
    kind: BackendKind,
    leaderboards: HashMap<String, LeaderboardManager>,
}

impl Arcade {
    pub fn builder() -> ArcadeBuilder {
        ArcadeBuilder::new()
    }

    pub fn hub(&self) -> &SessionHub {
        &self.hub
    }

    /// Whether the session talks to the live arcade or the simulator.
    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    pub fn leaderboard(&self, id: &str) -> Option<&LeaderboardManager> {
        self.leaderboards.get(id)
    }

    pub fn leaderboards(&self) -> impl Iterator<Item = &LeaderboardManager> {
        self.leaderboards.values()
    }

    /// Fetches every leaderboard with a non-empty id. Failures are logged
    /// and skipped; returns how many boards were fetched.
    pub async fn refresh_leaderboards(&self) -> usize {
        let mut fetched = 0;
        for manager in self.leaderboards.values() {
            if manager.leaderboard_id().is_empty() {
                continue;
            }
            match manager.get_leaderboard().await {
                Ok(_) => fetched += 1,
                Err(e) => tracing::warn!(
                    leaderboard = %manager.leaderboard_id(),
                    error = %e,
                    "initial leaderboard fetch failed"
                ),
            }
        }
        fetched
    }

    /// Disconnects the session hub.
    pub fn shutdown(&self) {
        self.hub.teardown();
    }
}

impl std::fmt::Debug for Arcade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arcade")
            .field("kind", &self.kind)
            .field("leaderboards", &self.leaderboards.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
