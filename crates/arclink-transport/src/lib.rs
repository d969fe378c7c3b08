//! The wire link between a live gateway and the arcade backend.
//!
//! A [`Connection`] moves whole messages in both directions and nothing
//! more: no framing, correlation, or retries. The gateway in
//! `arclink-backend` layers request ids and status pushes on top.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketConnection`], built on `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnection;

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique label for a connection, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates an id no other connection in this process has used.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link-{}", self.0)
    }
}

/// A message-oriented link to the backend.
///
/// All methods take `&self`: the gateway's reader task sits in `recv`
/// while callers `send` concurrently, so implementations keep the two
/// directions independent. Returned futures are `Send` for the same
/// reason.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Writes one message.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Waits for the next message. `Ok(None)` means the peer closed the
    /// link cleanly and no more messages will arrive.
    fn recv(&self) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send;

    /// Starts a clean close. A pending `recv` then returns `Ok(None)`.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn id(&self) -> ConnectionId;
}
