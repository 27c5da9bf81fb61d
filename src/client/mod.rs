//! Outbound HTTP client.
//!
//! This module provides a request builder and sender that:
//!
//! - **Validates early**: bad URLs, headers and duplicate query parameters
//!   fail when the request is built, never at send time
//! - **Retries** failed attempts (network errors, timeouts, rejected
//!   statuses) up to a configured count
//! - **Follows redirects** up to a bounded number of hops
//! - **Selects a transport**: legacy (HTTP/1.1, connection per request) or
//!   modern (pooled, HTTP/2-capable)
//! - **Runs in the background** on tokio tasks, optionally bounded by a
//!   [`Dispatcher`]
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── config    - ClientConfig, transport selection inputs
//! ├── fetch     - Client and the Request builder/sender
//! ├── transport - Transport trait, legacy and modern strategies
//! ├── dispatch  - PendingResponse and the bounded Dispatcher
//! └── utils     - Backoff, status and redirect helpers
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Owns the transport and defaults |
//! | [`Request`] | Immutable request value; `with_*` returns an updated copy |
//! | [`Transport`] | One HTTP round-trip |
//! | [`ClientConfig`] | Client configuration options |
//! | [`Dispatcher`] | Concurrency-bounded background sender |
//!
//! # Examples
//!
//! ## Creating a Client
//!
//! ```
//! use routewire::client::{Client, ClientConfig, TransportKind};
//!
//! // Default configuration
//! let client = Client::new();
//! assert_eq!(client.transport_kind(), TransportKind::Modern);
//!
//! // Custom configuration
//! let config = ClientConfig {
//!     attempts: 5,
//!     retry_delay_ms: 200,
//!     force_legacy_transport: true,
//!     ..Default::default()
//! };
//! let client = Client::with_config(config)?;
//! assert_eq!(client.transport_kind(), TransportKind::Legacy);
//! # Ok::<(), routewire::Error>(())
//! ```
//!
//! ## Building a Request
//!
//! ```
//! use routewire::client::Client;
//! use std::time::Duration;
//!
//! let request = Client::new()
//!     .post("https://api.example.com/items?draft=true")?
//!     .with_query_param("notify", "false")?
//!     .with_body(r#"{"name":"widget"}"#, "application/json")?
//!     .with_timeout(Duration::from_secs(5))
//!     .allow_error_status();
//!
//! assert_eq!(
//!     request.url().as_str(),
//!     "https://api.example.com/items?draft=true&notify=false"
//! );
//! # Ok::<(), routewire::Error>(())
//! ```
//!
//! ## Utility Functions
//!
//! ```
//! use routewire::client::{exponential_backoff, is_redirect_status};
//! use std::time::Duration;
//!
//! assert!(is_redirect_status(307));
//! assert!(!is_redirect_status(304));
//!
//! let delay = exponential_backoff(2, Duration::from_millis(100));
//! assert_eq!(delay, Duration::from_millis(400));
//! ```

mod config;
mod dispatch;
mod fetch;
mod transport;
mod utils;

pub use config::{ClientConfig, PlatformCapabilities, TransportKind};
pub use dispatch::{Dispatcher, PendingResponse};
pub use fetch::{Client, Request};
pub use transport::{LegacyTransport, ModernTransport, PreparedRequest, Transport};
pub use utils::*;
