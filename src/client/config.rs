//! Client configuration.
//!
//! [`ClientConfig`] carries the defaults every [`Request`](super::Request)
//! starts from, plus the inputs to transport selection. Configuration is
//! explicit: the transport is chosen from [`PlatformCapabilities`] and the
//! `force_legacy_transport` flag, never from ambient state. The only
//! environment read happens in [`ClientConfig::from_env`], which a host
//! calls once at startup.
//!
//! # Examples
//!
//! ```
//! use routewire::client::{ClientConfig, TransportKind};
//!
//! let config = ClientConfig {
//!     attempts: 3,
//!     force_legacy_transport: true,
//!     ..Default::default()
//! };
//! assert_eq!(config.transport_kind(), TransportKind::Legacy);
//! ```

use crate::error::{Error, Result};
use crate::protocol::constants::{
    DEFAULT_ATTEMPTS, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT, FORCE_LEGACY_TRANSPORT_ENV,
};
use crate::types::Charset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which transport strategy sends requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// HTTP/1.1 only, one connection per request.
    Legacy,
    /// Pooled connections, HTTP/2 negotiated when the server offers it.
    Modern,
}

impl TransportKind {
    /// Pick a transport: legacy when forced or when the platform cannot
    /// multiplex, modern otherwise.
    pub fn select(capabilities: &PlatformCapabilities, force_legacy: bool) -> Self {
        if force_legacy || !capabilities.multiplexing {
            TransportKind::Legacy
        } else {
            TransportKind::Modern
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Legacy => "legacy",
            TransportKind::Modern => "modern",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the hosting platform supports. Injected, not probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformCapabilities {
    /// The platform can run the multiplexing (modern) transport.
    pub multiplexing: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        PlatformCapabilities { multiplexing: true }
    }
}

/// Configuration for [`Client`](super::Client).
///
/// Deserializable so hosts can keep it in their own config files; missing
/// fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Send attempts per request (default: 2)
    pub attempts: u32,

    /// Per-attempt timeout in milliseconds (default: 30000)
    pub request_timeout_ms: u64,

    /// Base delay between attempts in milliseconds, doubled per retry
    /// (default: 0, retry immediately)
    pub retry_delay_ms: u64,

    /// Redirect hops followed per attempt (default: 10)
    pub max_redirects: usize,

    /// Text encoding for bodies and query strings (default: UTF-8)
    pub charset: Charset,

    /// Force the legacy transport regardless of capabilities
    pub force_legacy_transport: bool,

    /// Platform capabilities used for transport selection
    pub capabilities: PlatformCapabilities,

    /// Proxy URL applied to all requests (empty for none)
    pub proxy_url: String,

    /// `User-Agent` sent with every request
    pub user_agent: String,

    /// Log failed attempts at `warn` level
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            attempts: DEFAULT_ATTEMPTS,
            request_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            retry_delay_ms: 0,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            charset: Charset::Utf8,
            force_legacy_transport: false,
            capabilities: PlatformCapabilities::default(),
            proxy_url: String::new(),
            user_agent: concat!("routewire/", env!("CARGO_PKG_VERSION")).to_string(),
            enable_logging: true,
        }
    }
}

impl ClientConfig {
    /// Defaults, with the legacy-transport override read from
    /// `ROUTEWIRE_FORCE_LEGACY_TRANSPORT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let force = lookup(FORCE_LEGACY_TRANSPORT_ENV).is_some_and(|v| parse_flag(&v));
        ClientConfig {
            force_legacy_transport: force,
            ..Default::default()
        }
    }

    /// The transport this configuration selects.
    pub fn transport_kind(&self) -> TransportKind {
        TransportKind::select(&self.capabilities, self.force_legacy_transport)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Reject values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.attempts == 0 {
            return Err(Error::Config("attempts must be at least 1".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::Config("request_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Interpret an environment flag: `1`, `true`, `yes`, `on` (any case).
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
