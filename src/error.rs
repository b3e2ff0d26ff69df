//! Error taxonomy shared by every transport backend.

use frames::CodecError;

/// Result alias used across the transport API.
pub type Result<T> = std::result::Result<T, TransportError>;

// =============================================================================
// TRANSPORT ERROR
// =============================================================================

/// Failure reported by a [`crate::Connection`] operation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// `write` or `read` was attempted before a successful `connect`.
    #[error("not connected")]
    NotConnected,

    /// A framing precondition was violated, outbound or inbound.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] CodecError),

    /// The underlying network transport failed.
    #[error("network failure: {0}")]
    Network(#[from] NetworkCause),

    /// The remote endpoint answered with a non-success status.
    #[error("remote returned status {status} ({} byte body)", .body.len())]
    Remote { status: u16, body: Vec<u8> },
}

/// Original cause behind [`TransportError::Network`].
#[derive(Debug, thiserror::Error)]
pub enum NetworkCause {
    /// HTTP client failure: refused, reset, timed out, or body read error.
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// Websocket failure while opening, sending, or receiving.
    #[error("socket: {0}")]
    Socket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// The socket ended while a read was still waiting for a frame.
    #[error("socket closed by remote")]
    Closed,
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(NetworkCause::Http(error))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Network(NetworkCause::Socket(Box::new(error)))
    }
}

impl TransportError {
    /// Whether this failure came from the network rather than the caller.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
