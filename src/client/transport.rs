//! Transport strategies.
//!
//! A [`Transport`] performs exactly one HTTP round-trip: it sends a
//! [`PreparedRequest`] and returns the [`Response`] it got back. It does not
//! retry, follow redirects or judge the status; [`Request::send`] layers
//! those on top, so both strategies share one contract.
//!
//! | Strategy | Connections | Protocol |
//! |----------|-------------|----------|
//! | [`LegacyTransport`] | one per request | HTTP/1.1 only |
//! | [`ModernTransport`] | pooled | HTTP/2 when negotiated, else HTTP/1.1 |
//!
//! Each strategy lazily builds two reqwest clients: one that validates
//! certificates and one that accepts any certificate and hostname, used only
//! for requests that called
//! [`disable_certificate_validation`](super::Request::disable_certificate_validation).
//!
//! [`Request::send`]: super::Request::send

use super::config::{ClientConfig, TransportKind};
use crate::error::{Error, Result};
use crate::types::{HeaderSet, Method, Response};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// One hop of a request, ready for the wire.
///
/// The URL already carries the encoded query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderSet,
    pub body: Bytes,
    pub timeout: Duration,
    /// Accept any certificate chain and hostname.
    pub insecure: bool,
}

/// Sends a prepared request and produces a response.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Which strategy this is, recorded in response metadata.
    fn kind(&self) -> TransportKind;

    /// Perform one round-trip.
    async fn execute(&self, request: &PreparedRequest) -> Result<Response>;
}

/// Build the transport a configuration selects.
pub fn for_config(config: &ClientConfig) -> Arc<dyn Transport> {
    match config.transport_kind() {
        TransportKind::Legacy => Arc::new(LegacyTransport::new(config)),
        TransportKind::Modern => Arc::new(ModernTransport::new(config)),
    }
}

/// HTTP/1.1, connection-per-request transport.
#[derive(Debug)]
pub struct LegacyTransport {
    inner: ReqwestTransport,
}

impl LegacyTransport {
    pub fn new(config: &ClientConfig) -> Self {
        LegacyTransport {
            inner: ReqwestTransport::new(TransportKind::Legacy, config),
        }
    }
}

#[async_trait]
impl Transport for LegacyTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Legacy
    }

    async fn execute(&self, request: &PreparedRequest) -> Result<Response> {
        self.inner.execute(request).await
    }
}

/// Pooled, HTTP/2-capable transport.
#[derive(Debug)]
pub struct ModernTransport {
    inner: ReqwestTransport,
}

impl ModernTransport {
    pub fn new(config: &ClientConfig) -> Self {
        ModernTransport {
            inner: ReqwestTransport::new(TransportKind::Modern, config),
        }
    }
}

#[async_trait]
impl Transport for ModernTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Modern
    }

    async fn execute(&self, request: &PreparedRequest) -> Result<Response> {
        self.inner.execute(request).await
    }
}

/// Shared reqwest plumbing for both strategies.
struct ReqwestTransport {
    kind: TransportKind,
    proxy_url: String,
    user_agent: String,
    verified: Mutex<Option<reqwest::Client>>,
    insecure: Mutex<Option<reqwest::Client>>,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("kind", &self.kind)
            .field("proxy_url", &self.proxy_url)
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    fn new(kind: TransportKind, config: &ClientConfig) -> Self {
        ReqwestTransport {
            kind,
            proxy_url: config.proxy_url.clone(),
            user_agent: config.user_agent.clone(),
            verified: Mutex::new(None),
            insecure: Mutex::new(None),
        }
    }

    /// Get or build the reqwest client for this validation mode.
    fn client(&self, insecure: bool) -> Result<reqwest::Client> {
        let slot = if insecure { &self.insecure } else { &self.verified };
        let mut slot = slot.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = self.build(insecure)?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn build(&self, insecure: bool) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(self.user_agent.as_str())
            .tls_info(true);

        builder = match self.kind {
            TransportKind::Legacy => builder.http1_only().pool_max_idle_per_host(0),
            TransportKind::Modern => builder.pool_idle_timeout(Duration::from_secs(90)),
        };

        if !self.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&self.proxy_url)
                .map_err(|e| Error::Config(format!("invalid proxy URL {}: {}", self.proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        if insecure {
            tracing::debug!(transport = %self.kind, "building client without certificate validation");
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        builder.build().map_err(|e| Error::Config(e.to_string()))
    }

    async fn execute(&self, request: &PreparedRequest) -> Result<Response> {
        let client = self.client(request.insecure)?;

        let mut req_builder = client
            .request(request.method.into(), request.url.clone())
            .timeout(request.timeout)
            .headers(request.headers.to_header_map());
        if !request.body.is_empty() {
            req_builder = req_builder.body(request.body.clone());
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| classify(e, request.timeout))?;

        let status = response.status().as_u16();
        let headers = HeaderSet::from_header_map(response.headers());
        let version = format!("{:?}", response.version());
        let final_url = response.url().to_string();
        let remote_addr = response.remote_addr();
        let peer_certificate = response
            .extensions()
            .get::<reqwest::tls::TlsInfo>()
            .and_then(|info| info.peer_certificate())
            .map(|der| STANDARD.encode(der));

        let body = response
            .bytes()
            .await
            .map_err(|e| classify(e, request.timeout))?;

        let mut response = Response::from_parts(status, headers, body)
            .with_metadata("transport", self.kind.as_str())
            .with_metadata("http-version", version)
            .with_metadata("url", final_url);
        if let Some(addr) = remote_addr {
            response = response.with_metadata("remote-addr", addr.to_string());
        }
        if let Some(cert) = peer_certificate {
            response = response.with_metadata("peer-certificate", cert);
        }
        Ok(response)
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout(timeout)
    } else {
        Error::from(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_config_honours_override() {
        let config = ClientConfig {
            force_legacy_transport: true,
            ..Default::default()
        };
        assert_eq!(for_config(&config).kind(), TransportKind::Legacy);
        assert_eq!(for_config(&ClientConfig::default()).kind(), TransportKind::Modern);
    }

    #[test]
    fn test_clients_are_cached_per_mode() {
        let transport = ReqwestTransport::new(TransportKind::Modern, &ClientConfig::default());
        transport.client(false).unwrap();
        assert!(transport.verified.lock().is_some());
        assert!(transport.insecure.lock().is_none());
        transport.client(true).unwrap();
        assert!(transport.insecure.lock().is_some());
    }
}
