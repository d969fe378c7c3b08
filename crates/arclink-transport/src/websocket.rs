//! [`Connection`] over a WebSocket, via `tokio-tungstenite`.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Connection, ConnectionId, TransportError};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A WebSocket link to the arcade backend.
///
/// The socket is split so the writer and the reader lock separately.
/// Messages go out as text frames; both text and binary frames are
/// accepted inbound.
pub struct WebSocketConnection {
    id: ConnectionId,
    writer: Mutex<SplitSink<Socket, Message>>,
    reader: Mutex<SplitStream<Socket>>,
}

impl WebSocketConnection {
    /// Connects to `url` (`ws://` or `wss://`).
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (socket, _) = tokio_tungstenite::connect_async(url).await.map_err(|e| {
            TransportError::ConnectFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let id = ConnectionId::next();
        tracing::info!(%id, url, "gateway link open");

        let (writer, reader) = socket.split();
        Ok(Self {
            id,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        })
    }

    fn send_error(&self, e: tungstenite::Error) -> TransportError {
        match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::ConnectionClosed(self.id.to_string())
            }
            other => TransportError::SendFailed {
                conn: self.id,
                reason: other.to_string(),
            },
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let text = String::from_utf8_lossy(data).into_owned();
        let mut writer = self.writer.lock().await;
        writer
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| self.send_error(e))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut reader = self.reader.lock().await;
        while let Some(frame) = reader.next().await {
            let frame = frame.map_err(|e| TransportError::ReceiveFailed {
                conn: self.id,
                reason: e.to_string(),
            })?;
            match frame {
                Message::Text(text) => return Ok(Some(text.as_bytes().to_vec())),
                Message::Binary(bytes) => return Ok(Some(bytes.to_vec())),
                Message::Close(_) => break,
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        tracing::debug!(id = %self.id, "gateway link closed by peer");
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.close().await.map_err(|e| self.send_error(e))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
