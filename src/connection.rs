//! The connection contract every transport backend satisfies.

use crate::error::Result;

/// Uniform asynchronous connection over an interchangeable network backend.
///
/// Callers `connect`, queue outbound bytes with `write`, trigger the exchange
/// and collect the reply with `read`, and finally `close`. Backends differ in
/// how writes reach the wire, never in sequencing or error shape.
///
/// No operation completes synchronously: branches that need no I/O still
/// yield to the scheduler before resolving. None of them retries internally
/// or enforces a deadline; wrap calls in `tokio::time::timeout` for one.
#[async_trait::async_trait]
pub trait Connection: Send {
    /// Open the connection. A no-op success when already connected.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransportError::Network`] if the underlying resource
    /// cannot be established. The connection is left disconnected.
    async fn connect(&mut self) -> Result<()>;

    /// Whether the last `connect` succeeded and no `close` followed it.
    fn is_connected(&self) -> bool;

    /// Queue `bytes` for the next exchange.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransportError::NotConnected`] before `connect`, and
    /// backend-specific framing or network failures.
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flush everything written since the previous `read` and wait for the
    /// correlated inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransportError::NotConnected`] before `connect`,
    /// [`crate::TransportError::Network`] on transport failure, and
    /// backend-specific payload or remote-status failures.
    async fn read(&mut self) -> Result<Vec<u8>>;

    /// Release the network resource. Safe on a closed or never-opened
    /// connection.
    ///
    /// # Errors
    ///
    /// Backends in this crate never fail `close`; the signature keeps the
    /// contract uniform.
    async fn close(&mut self) -> Result<()>;
}

/// Resolve `value` only after yielding once to the scheduler.
pub(crate) async fn deferred<T>(value: T) -> T {
    tokio::task::yield_now().await;
    value
}
