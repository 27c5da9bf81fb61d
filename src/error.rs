//! Error types for routewire.
//!
//! One error enum covers both halves of the crate. Variants fall into three
//! groups:
//!
//! | Group | Variants | Retried? |
//! |-------|----------|----------|
//! | Construction | `InvalidUrl`, `InvalidHeader`, `InvalidParameter`, `DuplicateParameter` | never |
//! | Transport | `Transport`, `Timeout`, `HttpStatus`, `TooManyRedirects` | yes, up to the attempt count |
//! | Registration | `InvalidRoute`, `RouteConflict` | n/a |
//!
//! After the last attempt the client surfaces [`Error::RequestFailed`], which
//! wraps the final transport-group error.
//!
//! Router outcomes (400, 401, 404, 405, 500) are responses, not errors; see
//! [`crate::server::Router::dispatch`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias for routewire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the client, the shared value types and the router.
#[derive(Debug, Error)]
pub enum Error {
    /// The URL is not absolute or its scheme is not `http`/`https`.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value failed validation.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader {
        /// Offending header name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A form parameter had an empty key.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A query parameter with this name was already set on the request.
    #[error("duplicate query parameter: {0}")]
    DuplicateParameter(String),

    /// The underlying transport failed (connect, I/O, protocol).
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting for a response.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The final response carried a 4xx/5xx status and error statuses were
    /// not allowed on the request.
    #[error("HTTP {status}")]
    HttpStatus {
        /// Status code of the rejected response.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },

    /// The redirect chain was longer than the request allows.
    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// Every attempt failed; `source` is the last failure.
    #[error("request failed after {attempts} attempt(s): {source}")]
    RequestFailed {
        /// How many attempts were made.
        attempts: u32,
        /// The final underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// A route template was rejected at registration.
    #[error("invalid route template: {0}")]
    InvalidRoute(String),

    /// A route with the same method and an equivalent template exists.
    #[error("route conflict: {method} {template}")]
    RouteConflict {
        /// Method of the rejected route (`*` for any).
        method: String,
        /// Template of the rejected route.
        template: String,
    },

    /// A body could not be serialized or deserialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The runtime backing a blocking or spawned send failed.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Whether the client's retry loop should try again after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::Timeout(_)
                | Error::HttpStatus { .. }
                | Error::TooManyRedirects(_)
        )
    }

    /// Status code carried by this error, looking through `RequestFailed`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::RequestFailed { source, .. } => source.status(),
            _ => None,
        }
    }

    pub(crate) fn invalid_header(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidHeader {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}
