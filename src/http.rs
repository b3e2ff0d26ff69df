//! Request/response backend over HTTP.
//!
//! DESIGN
//! ======
//! HTTP establishes a new exchange per request, so `connect` only prepares a
//! client and marks the connection ready. Writes accumulate in an outbound
//! queue; `read` drains the queue into one body and performs the exchange:
//! GET when nothing was written, POST with the raw concatenation otherwise.
//! Bodies are never framed in either direction.
//!
//! Access is single-caller: the queue and its length are mutated without
//! synchronization, which `&mut self` on every mutating method enforces.

use crate::config::HttpConfig;
use crate::connection::{Connection, deferred};
use crate::error::{Result, TransportError};
use crate::state::ConnectionState;

/// [`Connection`] backed by a stateless HTTP request/response channel.
pub struct HttpConnection {
    config: HttpConfig,
    endpoint: String,
    state: ConnectionState,
    client: Option<reqwest::Client>,
    outbound: Vec<Vec<u8>>,
    outbound_len: usize,
}

impl HttpConnection {
    #[must_use]
    pub fn new(config: HttpConfig) -> Self {
        let endpoint = config.endpoint();
        tracing::debug!(%endpoint, "http connection created");
        Self {
            config,
            endpoint,
            state: ConnectionState::Disconnected,
            client: None,
            outbound: Vec::new(),
            outbound_len: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Total bytes queued since the last `read`.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.outbound_len
    }

    fn take_outbound(&mut self) -> Vec<u8> {
        let chunks = std::mem::take(&mut self.outbound);
        self.outbound_len = 0;
        chunks.concat()
    }

    fn reset(&mut self) {
        self.client = None;
        self.outbound.clear();
        self.outbound_len = 0;
    }
}

#[async_trait::async_trait]
impl Connection for HttpConnection {
    async fn connect(&mut self) -> Result<()> {
        if self.state.is_connected() {
            return deferred(Ok(())).await;
        }

        self.state = ConnectionState::Connecting;
        self.reset();
        let client = match reqwest::Client::builder()
            .local_address(self.config.local_address)
            .build()
        {
            Ok(client) => client,
            Err(error) => {
                tracing::error!(endpoint = %self.endpoint, %error, "http client build failed");
                self.state = ConnectionState::Disconnected;
                return deferred(Err(error.into())).await;
            }
        };

        self.client = Some(client);
        self.state = ConnectionState::Connected;
        tracing::debug!(endpoint = %self.endpoint, "http connection ready");
        deferred(Ok(())).await
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.state.is_connected() {
            return deferred(Err(TransportError::NotConnected)).await;
        }

        self.outbound.push(bytes.to_vec());
        self.outbound_len += bytes.len();
        tracing::debug!(len = bytes.len(), total = self.outbound_len, "queued outbound chunk");
        deferred(Ok(())).await
    }

    async fn read(&mut self) -> Result<Vec<u8>> {
        if !self.state.is_connected() {
            return deferred(Err(TransportError::NotConnected)).await;
        }

        // Drained before the exchange so a failure never resends stale bytes.
        let fetch = self.outbound_len == 0;
        let body = self.take_outbound();
        let len = body.len();

        let Some(client) = &self.client else {
            return deferred(Err(TransportError::NotConnected)).await;
        };
        let request = if fetch {
            client.get(&self.endpoint)
        } else {
            client.post(&self.endpoint).body(body)
        };

        tracing::debug!(endpoint = %self.endpoint, len, fetch, "sending exchange");
        let response = request.send().await.inspect_err(|error| {
            tracing::error!(endpoint = %self.endpoint, %error, "exchange failed");
        })?;

        let status = response.status();
        let inbound = response.bytes().await?.to_vec();
        tracing::debug!(endpoint = %self.endpoint, status = status.as_u16(), len = inbound.len(), "exchange complete");

        if !status.is_success() {
            return Err(TransportError::Remote { status: status.as_u16(), body: inbound });
        }
        Ok(inbound)
    }

    async fn close(&mut self) -> Result<()> {
        if self.state != ConnectionState::Disconnected {
            tracing::debug!(endpoint = %self.endpoint, "http connection closed");
        }
        self.state = ConnectionState::Disconnected;
        self.reset();
        deferred(Ok(())).await
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
