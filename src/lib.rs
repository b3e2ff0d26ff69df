//! Transport layer for a binary remote-procedure client.
//!
//! DESIGN
//! ======
//! Moves opaque byte payloads between the protocol layer above (encryption,
//! authorization, RPC framing) and a remote service. Two interchangeable
//! backends implement one [`Connection`] contract:
//!
//! - [`HttpConnection`]: stateless request/response. Writes accumulate in an
//!   outbound queue; each `read` sends the concatenation as one exchange.
//! - [`WsConnection`]: persistent websocket. Sends the abridged handshake
//!   byte on connect; each `write` is one abridged frame on the wire and each
//!   `read` waits for one inbound frame.
//!
//! Payload contents are never interpreted, retried, reordered, or batched
//! beyond what the caller submits.

pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod state;
pub mod ws;

pub use config::{ConfigError, HttpConfig, WsConfig};
pub use connection::Connection;
pub use error::{NetworkCause, Result, TransportError};
pub use http::HttpConnection;
pub use state::ConnectionState;
pub use ws::WsConnection;
