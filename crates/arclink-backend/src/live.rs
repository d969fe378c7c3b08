//! Live gateway: the real arcade backend over a [`Connection`].
//!
//! Calls are multiplexed on one connection. Each call registers a oneshot
//! reply slot under a fresh [`RequestId`] and sends a [`GatewayRequest`]; a
//! reader task owns the receive side and routes every inbound frame:
//!
//! ```text
//!   call() ──send──→ [connection] ──recv──→ reader task
//!     ↑                                        │
//!     └──────── pending[id] (oneshot) ←────────┤ reply / rejected
//!                                              │
//!               status sink ←──────────────────┘ loginStatus
//! ```
//!
//! When the connection closes, every pending call fails with
//! [`BackendError::ConnectionClosed`] and later calls fail immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arclink_protocol::{
    CatalogResponse, Codec, CurrencyResponse, GatewayCall, GatewayFrame, GatewayRequest,
    InventoryResponse, ItemId, JsonCodec, LeaderboardQuery, LeaderboardResponse, PurchaseReceipt,
    RequestId, UserResponse,
};
use arclink_transport::Connection;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::{Backend, BackendError, BackendKind, StatusSink};

type ReplySlot = oneshot::Sender<Result<serde_json::Value, BackendError>>;

/// A [`Backend`] that forwards every operation to the arcade backend.
pub struct LiveGateway<C: Connection> {
    inner: Arc<GatewayInner<C>>,
    reader: JoinHandle<()>,
}

struct GatewayInner<C: Connection> {
    conn: C,
    codec: JsonCodec,
    next_id: AtomicU64,
    /// Calls awaiting a reply. The `closed` flag lives under the same lock
    /// so a call can never register after the reader has drained the map.
    pending: Mutex<Pending>,
    logged_in: AtomicBool,
    sink: Mutex<Option<StatusSink>>,
}

#[derive(Default)]
struct Pending {
    slots: HashMap<RequestId, ReplySlot>,
    closed: bool,
}

impl<C: Connection> LiveGateway<C> {
    /// Wraps an open connection and starts the reader task.
    ///
    /// Must be called from within a Tokio runtime. The cached login status
    /// starts as logged out; call [`sync_login_status`](Self::sync_login_status)
    /// to ask the backend.
    pub fn new(conn: C) -> Self {
        let inner = Arc::new(GatewayInner {
            conn,
            codec: JsonCodec,
            next_id: AtomicU64::new(1),
            pending: Mutex::new(Pending::default()),
            logged_in: AtomicBool::new(false),
            sink: Mutex::new(None),
        });

        let reader = tokio::spawn(read_loop(Arc::clone(&inner)));
        tracing::info!(conn = %inner.conn.id(), "live gateway started");

        Self { inner, reader }
    }

    /// Asks the backend whether the user is logged in and caches the answer.
    ///
    /// Doesn't notify the status sink; the backend pushes a `loginStatus`
    /// frame for real transitions.
    pub async fn sync_login_status(&self) -> Result<bool, BackendError> {
        let logged_in: bool = self.inner.call(GatewayCall::IsLoggedIn).await?;
        self.inner.logged_in.store(logged_in, Ordering::SeqCst);
        Ok(logged_in)
    }

    /// Closes the underlying connection. Pending calls fail once the
    /// reader observes the close.
    pub async fn close(&self) -> Result<(), BackendError> {
        self.inner
            .conn
            .close()
            .await
            .map_err(|e| BackendError::Transport(Box::new(e)))
    }
}

#[cfg(feature = "websocket")]
impl LiveGateway<arclink_transport::WebSocketConnection> {
    /// Connects to the arcade backend at `url` and syncs the login status.
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let conn = arclink_transport::WebSocketConnection::connect(url)
            .await
            .map_err(|e| BackendError::Transport(Box::new(e)))?;
        let gateway = Self::new(conn);
        gateway.sync_login_status().await?;
        Ok(gateway)
    }
}

impl<C: Connection> Drop for LiveGateway<C> {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl<C: Connection> GatewayInner<C> {
    async fn call<T: DeserializeOwned + Send>(&self, call: GatewayCall) -> Result<T, BackendError> {
        let op = call.op();
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let bytes = self.codec.encode(&GatewayRequest { id, call })?;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if pending.closed {
                return Err(BackendError::ConnectionClosed);
            }
            pending.slots.insert(id, tx);
        }

        tracing::debug!(%id, op, "gateway call");
        if let Err(e) = self.conn.send(&bytes).await {
            self.pending.lock().slots.remove(&id);
            return Err(BackendError::Transport(Box::new(e)));
        }

        let result = rx.await.map_err(|_| BackendError::ConnectionClosed)??;
        serde_json::from_value(result)
            .map_err(|e| BackendError::MalformedResponse(format!("{op}: {e}")))
    }

    fn handle_frame(&self, data: &[u8]) {
        let frame: GatewayFrame = match self.codec.decode(data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed gateway frame");
                return;
            }
        };

        match frame {
            GatewayFrame::Reply { id, result } => self.resolve(id, Ok(result)),
            GatewayFrame::Rejected { id, error } => {
                self.resolve(id, Err(BackendError::from_rejection(error)))
            }
            GatewayFrame::LoginStatus(status) => {
                let status = status.login_status();
                self.logged_in
                    .store(status.is_logged_in(), Ordering::SeqCst);
                tracing::info!(%status, "host login status changed");
                // Clone out of the lock: the sink may call back into us.
                let sink = self.sink.lock().clone();
                if let Some(sink) = sink {
                    sink(status);
                }
            }
        }
    }

    fn resolve(&self, id: RequestId, result: Result<serde_json::Value, BackendError>) {
        let slot = self.pending.lock().slots.remove(&id);
        match slot {
            // The caller may have given up; a dropped receiver is fine.
            Some(slot) => {
                let _ = slot.send(result);
            }
            None => tracing::debug!(%id, "reply for unknown request"),
        }
    }

    fn fail_all(&self) {
        let slots = {
            let mut pending = self.pending.lock();
            pending.closed = true;
            std::mem::take(&mut pending.slots)
        };
        if !slots.is_empty() {
            tracing::warn!(count = slots.len(), "failing pending gateway calls");
        }
        for (_, slot) in slots {
            let _ = slot.send(Err(BackendError::ConnectionClosed));
        }
    }
}

async fn read_loop<C: Connection>(inner: Arc<GatewayInner<C>>) {
    loop {
        match inner.conn.recv().await {
            Ok(Some(data)) => inner.handle_frame(&data),
            Ok(None) => {
                tracing::info!(conn = %inner.conn.id(), "gateway connection closed");
                break;
            }
            Err(e) => {
                tracing::warn!(conn = %inner.conn.id(), error = %e, "gateway receive failed");
                break;
            }
        }
    }
    inner.fail_all();
}

#[async_trait]
impl<C: Connection> Backend for LiveGateway<C> {
    fn kind(&self) -> BackendKind {
        BackendKind::Live
    }

    fn attach(&self, sink: StatusSink) {
        *self.inner.sink.lock() = Some(sink);
    }

    fn detach(&self) {
        self.inner.sink.lock().take();
    }

    fn is_logged_in(&self) -> bool {
        self.inner.logged_in.load(Ordering::SeqCst)
    }

    async fn login_button_pressed(&self) -> Result<bool, BackendError> {
        self.inner.call(GatewayCall::LoginButtonPressed).await
    }

    async fn get_amount_currency(&self) -> Result<CurrencyResponse, BackendError> {
        self.inner.call(GatewayCall::GetAmountCurrency).await
    }

    async fn get_inventory(&self) -> Result<InventoryResponse, BackendError> {
        self.inner.call(GatewayCall::GetInventory).await
    }

    async fn get_catalog(&self, game_id: &str) -> Result<CatalogResponse, BackendError> {
        self.inner
            .call(GatewayCall::GetCatalog {
                game_id: game_id.to_string(),
            })
            .await
    }

    async fn purchase_item(
        &self,
        game_id: &str,
        item_id: &ItemId,
        price: u64,
    ) -> Result<PurchaseReceipt, BackendError> {
        self.inner
            .call(GatewayCall::PurchaseItem {
                game_id: game_id.to_string(),
                item_id: item_id.clone(),
                price,
            })
            .await
    }

    async fn get_user(&self) -> Result<UserResponse, BackendError> {
        self.inner.call(GatewayCall::GetUser).await
    }

    async fn submit_score(&self, leaderboard_id: &str, raw_score: i64) -> Result<(), BackendError> {
        let _ack: IgnoredAny = self
            .inner
            .call(GatewayCall::SubmitScore {
                leaderboard_id: leaderboard_id.to_string(),
                score: raw_score,
            })
            .await?;
        Ok(())
    }

    async fn get_leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<LeaderboardResponse, BackendError> {
        self.inner
            .call(GatewayCall::GetLeaderboard(query.clone()))
            .await
    }
}
