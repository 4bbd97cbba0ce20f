//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! Each accepted stream is split into sink and stream halves guarded by
//! separate locks, so the per-connection writer task can push outbound
//! frames while the reader task is parked on `recv`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsStream = SplitStream<WebSocketStream<TcpStream>>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(TransportError::Bind)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| TransportError::Accept(e.to_string()))?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| TransportError::Accept(e.to_string()))?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            sink: Arc::new(Mutex::new(sink)),
            stream: Arc::new(Mutex::new(stream)),
        })
    }
}

/// A single WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Arc<Mutex<WsSink>>,
    stream: Arc<Mutex<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        let msg = Message::Text(text.into());
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.into()) {
                    Ok(text) => return Ok(Some(text)),
                    Err(_) => {
                        tracing::debug!(id = %self.id, "dropping non-UTF-8 binary frame");
                        continue;
                    }
                },
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/frame
                Some(Err(e)) => return Err(TransportError::Receive(e.to_string())),
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
