//! Persistent-socket backend over a websocket using abridged framing.
//!
//! DESIGN
//! ======
//! - `connect` opens the socket and sends the one-byte handshake flag before
//!   reporting success. Any failure before that point discards the socket.
//! - `write` frames each call independently and sends it at once; there is no
//!   outbound accumulation on this backend.
//! - `read` waits for exactly one binary message and decodes one frame from
//!   it. Waiting polls the socket stream directly, so dropping a pending read
//!   (caller timeout, `select!`) never loses an inbound message.
//!
//! A failed `write` or `read` leaves the socket in place; callers `close`
//! before reconnecting.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::WsConfig;
use crate::connection::{Connection, deferred};
use crate::error::{NetworkCause, Result, TransportError};
use crate::state::ConnectionState;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`Connection`] backed by a long-lived full-duplex websocket.
pub struct WsConnection {
    url: String,
    state: ConnectionState,
    socket: Option<Socket>,
}

impl WsConnection {
    #[must_use]
    pub fn new(config: WsConfig) -> Self {
        tracing::debug!(url = %config.url, "ws connection created");
        Self { url: config.url, state: ConnectionState::Disconnected, socket: None }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn fail_connect(&mut self, error: impl Into<TransportError>) -> TransportError {
        self.socket = None;
        self.state = ConnectionState::Disconnected;
        error.into()
    }
}

#[async_trait::async_trait]
impl Connection for WsConnection {
    async fn connect(&mut self) -> Result<()> {
        if self.socket.is_some() && self.state.is_connected() {
            return deferred(Ok(())).await;
        }

        self.state = ConnectionState::Connecting;
        self.socket = None;
        tracing::debug!(url = %self.url, "connecting");

        let opened = connect_async(self.url.as_str()).await;
        let mut socket = match opened {
            Ok((socket, _response)) => socket,
            Err(error) => {
                tracing::error!(url = %self.url, %error, "ws connect failed");
                return Err(self.fail_connect(error));
            }
        };

        tracing::debug!(url = %self.url, "sending abridged flag");
        let flag = vec![frames::HANDSHAKE_FLAG];
        if let Err(error) = socket.send(Message::Binary(flag.into())).await {
            tracing::error!(url = %self.url, %error, "sending abridged flag failed");
            return Err(self.fail_connect(error));
        }

        self.socket = Some(socket);
        self.state = ConnectionState::Connected;
        tracing::debug!(url = %self.url, "connected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some() && self.state.is_connected()
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(socket) = self.socket.as_mut() else {
            return deferred(Err(TransportError::NotConnected)).await;
        };
        let frame = match frames::encode(bytes) {
            Ok(frame) => frame,
            Err(error) => return deferred(Err(error.into())).await,
        };

        let len = frame.len();
        socket.send(Message::Binary(frame.into())).await.inspect_err(|error| {
            tracing::error!(url = %self.url, %error, len, "ws write failed");
        })?;
        tracing::debug!(url = %self.url, len, "wrote frame");
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>> {
        let Some(socket) = self.socket.as_mut() else {
            return deferred(Err(TransportError::NotConnected)).await;
        };

        tracing::debug!(url = %self.url, "reading");
        loop {
            let Some(message) = socket.next().await else {
                tracing::warn!(url = %self.url, "ws stream ended while reading");
                return Err(NetworkCause::Closed.into());
            };
            match message {
                Ok(Message::Binary(data)) => {
                    let (payload, consumed) = frames::decode(&data).inspect_err(|error| {
                        tracing::warn!(url = %self.url, %error, "malformed inbound frame");
                    })?;
                    if consumed < data.len() {
                        tracing::warn!(url = %self.url, excess = data.len() - consumed, "ignoring bytes after frame");
                    }
                    tracing::debug!(url = %self.url, len = payload.len(), "read frame");
                    return Ok(payload.to_vec());
                }
                Ok(Message::Close(_)) => {
                    tracing::warn!(url = %self.url, "ws closed by remote while reading");
                    return Err(NetworkCause::Closed.into());
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::error!(url = %self.url, %error, "ws read failed");
                    return Err(error.into());
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.state = ConnectionState::Disconnected;
        let Some(mut socket) = self.socket.take() else {
            return deferred(Ok(())).await;
        };

        tracing::debug!(url = %self.url, "disconnecting");
        if let Err(error) = socket.close(None).await {
            tracing::debug!(url = %self.url, %error, "ws close handshake not delivered");
        }
        tracing::debug!(url = %self.url, "disconnected");
        Ok(())
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
