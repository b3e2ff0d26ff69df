//! Transport configuration parsed from code or environment variables.
//!
//! The request/response backend is addressed by scheme, host, port and a fixed
//! endpoint path. The persistent-socket backend takes one websocket URL.

use std::net::IpAddr;

pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 80;
pub const ENDPOINT_PATH: &str = "/apiw1";

/// Errors produced while reading transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing config: env var {var} not set")]
    Missing { var: &'static str },

    /// A value was present but could not be parsed.
    #[error("invalid config: {var}={value}")]
    Invalid { var: &'static str, value: String },
}

// =============================================================================
// REQUEST/RESPONSE CONFIG
// =============================================================================

/// Address of the request/response endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Local interface outbound requests are bound to, if any.
    pub local_address: Option<IpAddr>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_owned(),
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            path: ENDPOINT_PATH.to_owned(),
            local_address: None,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, ..Self::default() }
    }

    /// Build config from environment variables.
    ///
    /// All optional, falling back to the defaults:
    /// - `RPC_HTTP_SCHEME`: `http` (default) or `https`, trailing `:` allowed
    /// - `RPC_HTTP_HOST`: default `localhost`
    /// - `RPC_HTTP_PORT`: default 80
    /// - `LOCAL_ADDRESS`: local IP to bind outbound requests to
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown scheme, a non-numeric
    /// port, or an unparseable local address.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`HttpConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let scheme = parse_scheme(lookup("RPC_HTTP_SCHEME").as_deref())?;
        let host = lookup("RPC_HTTP_HOST")
            .filter(|host| !host.is_empty())
            .unwrap_or(defaults.host);
        let port = parse_port(lookup("RPC_HTTP_PORT").as_deref())?;
        let local_address = parse_local_address(lookup("LOCAL_ADDRESS").as_deref())?;

        Ok(Self { scheme, host, port, path: defaults.path, local_address })
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_local_address(mut self, address: IpAddr) -> Self {
        self.local_address = Some(address);
        self
    }

    /// Full URL every exchange is sent to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let scheme = self.scheme.trim_end_matches(':');
        format!("{scheme}://{}:{}{}", self.host, self.port, self.path)
    }
}

// =============================================================================
// PERSISTENT-SOCKET CONFIG
// =============================================================================

/// Address of the persistent-socket endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsConfig {
    pub url: String,
}

impl WsConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Build config from `RPC_WS_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the variable is unset and
    /// [`ConfigError::Invalid`] when it is not a `ws://` or `wss://` URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`WsConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup("RPC_WS_URL").ok_or(ConfigError::Missing { var: "RPC_WS_URL" })?;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ConfigError::Invalid { var: "RPC_WS_URL", value: url });
        }
        Ok(Self { url })
    }
}

fn parse_scheme(raw: Option<&str>) -> Result<String, ConfigError> {
    match raw.map(|s| s.trim_end_matches(':')) {
        None | Some("") => Ok(DEFAULT_SCHEME.to_owned()),
        Some(scheme @ ("http" | "https")) => Ok(scheme.to_owned()),
        Some(other) => Err(ConfigError::Invalid { var: "RPC_HTTP_SCHEME", value: other.to_owned() }),
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid { var: "RPC_HTTP_PORT", value: value.to_owned() }),
    }
}

fn parse_local_address(raw: Option<&str>) -> Result<Option<IpAddr>, ConfigError> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<IpAddr>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var: "LOCAL_ADDRESS", value: value.to_owned() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
