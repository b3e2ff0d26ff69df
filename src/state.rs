//! Connection lifecycle state.
//!
//! DESIGN
//! ======
//! Every backend walks the same lifecycle:
//! `Disconnected -> Connecting -> Connected -> Disconnected`. The terminal
//! state is reusable: calling `connect` again starts a fresh cycle with a new
//! network resource. Only `Connected` counts as connected.

use std::fmt;

/// Lifecycle position of a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
