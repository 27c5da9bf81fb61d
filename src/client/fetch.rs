//! Request builder and sender.
//!
//! A [`Client`] owns a transport and the configuration defaults. Each call
//! to [`Client::request`] (or a verb helper) produces a [`Request`]: an
//! immutable value whose `with_*` methods return an updated copy. Sending
//! runs three layers around the transport:
//!
//! 1. **Retry**: up to `attempts` tries; each failed try is logged and,
//!    when a retry delay is configured, followed by exponential backoff.
//! 2. **Redirects**: 301/302/303/307/308 responses with a `Location` are
//!    chased, up to `max_redirects` hops per attempt.
//! 3. **Status policy**: a final 4xx/5xx fails with
//!    [`Error::HttpStatus`] unless [`Request::allow_error_status`] was set.
//!
//! # Examples
//!
//! ```ignore
//! use routewire::Client;
//!
//! #[tokio::main]
//! async fn main() -> routewire::Result<()> {
//!     let client = Client::new();
//!     let response = client
//!         .get("https://api.example.com/users")?
//!         .with_query_param("page", "2")?
//!         .with_basic_auth("jane", "s3cret")?
//!         .with_attempts(3)
//!         .send()
//!         .await?;
//!     println!("{} {}", response.status(), response.text());
//!     Ok(())
//! }
//! ```

use super::config::{ClientConfig, TransportKind};
use super::dispatch::PendingResponse;
use super::transport::{self, PreparedRequest, Transport};
use super::utils;
use crate::error::{Error, Result};
use crate::protocol::{self, constants::headers, constants::media_types};
use crate::types::{Charset, FormParameters, HeaderSet, Method, Response};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// Outbound HTTP client.
///
/// Cheap to clone; clones share the transport and its connection state.
#[derive(Clone, Debug)]
pub struct Client {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Create a client with default configuration.
    pub fn new() -> Self {
        let config = ClientConfig::default();
        Client {
            transport: transport::for_config(&config),
            config: Arc::new(config),
        }
    }

    /// Create a client whose transport is selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `config` fails
    /// [`ClientConfig::validate`].
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = transport::for_config(&config);
        Ok(Client {
            transport,
            config: Arc::new(config),
        })
    }

    /// Create a client around an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `config` fails
    /// [`ClientConfig::validate`].
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Client {
            transport,
            config: Arc::new(config),
        })
    }

    /// Start a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] unless `url` is absolute with an
    /// `http` or `https` scheme.
    pub fn request(&self, method: Method, url: &str) -> Result<Request> {
        Request::new(self.clone(), method, url)
    }

    pub fn get(&self, url: &str) -> Result<Request> {
        self.request(Method::Get, url)
    }

    pub fn post(&self, url: &str) -> Result<Request> {
        self.request(Method::Post, url)
    }

    pub fn put(&self, url: &str) -> Result<Request> {
        self.request(Method::Put, url)
    }

    pub fn patch(&self, url: &str) -> Result<Request> {
        self.request(Method::Patch, url)
    }

    pub fn delete(&self, url: &str) -> Result<Request> {
        self.request(Method::Delete, url)
    }

    pub fn head(&self, url: &str) -> Result<Request> {
        self.request(Method::Head, url)
    }

    /// The strategy requests are sent with.
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// An outbound request.
///
/// Builder methods consume the value and return the updated one, so a
/// request is never shared half-built. Send it with [`Request::send`],
/// [`Request::spawn`] or [`Request::send_blocking`].
#[derive(Clone, Debug)]
pub struct Request {
    client: Client,
    method: Method,
    /// Target without query or fragment.
    url: Url,
    /// The caller's query string, sent as given.
    raw_query: Option<String>,
    /// Parsed view of `raw_query` plus `added`.
    query: FormParameters,
    /// Parameters added through the builder, appended after `raw_query`.
    added: FormParameters,
    headers: HeaderSet,
    body: Bytes,
    charset: Charset,
    attempts: u32,
    timeout: Duration,
    retry_delay: Duration,
    max_redirects: usize,
    allow_error_status: bool,
    insecure: bool,
}

impl Request {
    fn new(client: Client, method: Method, raw_url: &str) -> Result<Self> {
        let config = client.config.clone();
        let mut url = utils::parse_http_url(raw_url)?;
        let raw_query = url.query().map(str::to_string);
        let query = FormParameters::parse(raw_query.as_deref().unwrap_or(""), config.charset);
        url.set_query(None);
        url.set_fragment(None);

        Ok(Request {
            client,
            method,
            url,
            raw_query,
            query,
            added: FormParameters::empty(),
            headers: HeaderSet::new(),
            body: Bytes::new(),
            charset: config.charset,
            attempts: config.attempts,
            timeout: config.timeout(),
            retry_delay: config.retry_delay(),
            max_redirects: config.max_redirects,
            allow_error_status: false,
            insecure: false,
        })
    }

    /// Add a header, or replace every existing value when `replace` is set.
    pub fn with_header(mut self, name: &str, value: &str, replace: bool) -> Result<Self> {
        self.headers = if replace {
            self.headers.replace(name, value)?
        } else {
            self.headers.append(name, value)?
        };
        Ok(self)
    }

    /// Set the body and its `Content-Type`, replacing any existing one.
    pub fn with_body(mut self, body: impl Into<Bytes>, content_type: &str) -> Result<Self> {
        self.headers = self.headers.replace(headers::CONTENT_TYPE, content_type)?;
        self.body = body.into();
        Ok(self)
    }

    /// Set a text body encoded with the request charset.
    pub fn with_text(self, text: &str, content_type: &str) -> Result<Self> {
        let content_type = protocol::content_type_with_charset(content_type, self.charset);
        let body = Bytes::from(self.charset.encode(text).into_owned());
        self.with_body(body, &content_type)
    }

    /// Set a URL-encoded form body.
    pub fn with_form(self, form: &FormParameters) -> Result<Self> {
        let content_type = protocol::content_type_with_charset(media_types::FORM_URLENCODED, self.charset);
        let body = form.encode(self.charset);
        self.with_body(body, &content_type)
    }

    /// Add a query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParameter`] when `name` is already set and
    /// [`Error::InvalidParameter`] when it is empty.
    pub fn with_query_param(mut self, name: &str, value: &str) -> Result<Self> {
        if self.query.contains_key(name) {
            return Err(Error::DuplicateParameter(name.to_string()));
        }
        self.query = self.query.with(name, value)?;
        self.added = self.added.with(name, value)?;
        Ok(self)
    }

    /// Append a whole parameter set. Duplicates pass through.
    pub fn with_query(mut self, params: &FormParameters) -> Self {
        self.query = self.query.merge(params);
        self.added = self.added.merge(params);
        self
    }

    /// Set `Authorization: Basic ...`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] when the credentials contain
    /// characters a header value cannot carry.
    pub fn with_basic_auth(mut self, user: &str, password: &str) -> Result<Self> {
        self.headers = self
            .headers
            .replace(headers::AUTHORIZATION, protocol::format_basic_auth(user, password))?;
        Ok(self)
    }

    /// Set `Authorization: Bearer ...`.
    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self> {
        self.headers = self
            .headers
            .replace(headers::AUTHORIZATION, protocol::format_bearer_auth(token))?;
        Ok(self)
    }

    /// Number of send attempts; values below 1 are treated as 1.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base delay between attempts, doubled on every retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Return 4xx/5xx responses instead of failing.
    pub fn allow_error_status(mut self) -> Self {
        self.allow_error_status = true;
        self
    }

    /// Accept any certificate chain and any hostname for this request.
    pub fn disable_certificate_validation(mut self) -> Self {
        self.insecure = true;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn query(&self) -> &FormParameters {
        &self.query
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The target URL: the caller's query string untouched, followed by the
    /// encoded builder parameters.
    pub fn url(&self) -> Url {
        let mut url = self.url.clone();
        let added = (!self.added.is_empty()).then(|| self.added.encode(self.charset));
        let query = match (self.raw_query.as_deref(), added) {
            (Some(raw), Some(added)) if !raw.is_empty() => Some(format!("{}&{}", raw, added)),
            (Some(raw), None) => Some(raw.to_string()),
            (_, added) => added,
        };
        url.set_query(query.as_deref());
        url
    }

    /// Send the request, retrying and following redirects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestFailed`] wrapping the last failure once every
    /// attempt has failed.
    pub async fn send(&self) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.attempts => {
                    let delay = if self.retry_delay.is_zero() {
                        Duration::ZERO
                    } else {
                        utils::exponential_backoff(attempt - 1, self.retry_delay)
                    };
                    if self.client.config.enable_logging {
                        tracing::warn!(
                            "Request {} {} failed (attempt {}/{}), retrying after {:?}: {}",
                            self.method,
                            self.url,
                            attempt,
                            self.attempts,
                            delay,
                            e
                        );
                    }
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
                Err(e) => {
                    return Err(Error::RequestFailed {
                        attempts: attempt,
                        source: Box::new(e),
                    })
                }
            }
        }
    }

    /// Send on a new tokio task and return a handle to the result.
    ///
    /// Dropping the handle does not cancel the request.
    pub fn spawn(self) -> PendingResponse {
        PendingResponse::spawn(async move { self.send().await })
    }

    /// Send on a new tokio task and report the outcome through callbacks.
    pub fn spawn_with_callbacks<S, F>(self, on_response: S, on_failure: F) -> tokio::task::JoinHandle<()>
    where
        S: FnOnce(Response) + Send + 'static,
        F: FnOnce(Error) + Send + 'static,
    {
        tokio::spawn(async move {
            match self.send().await {
                Ok(response) => on_response(response),
                Err(e) => on_failure(e),
            }
        })
    }

    /// Send from synchronous code, blocking the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called from inside a tokio runtime
    /// or when a runtime cannot be created.
    pub fn send_blocking(&self) -> Result<Response> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Runtime(
                "send_blocking called from within an async runtime; use send().await".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Runtime(e.to_string()))?;
        runtime.block_on(self.send())
    }

    /// One attempt: round-trip, redirect chase, status policy.
    async fn attempt(&self) -> Result<Response> {
        let mut hop = self.prepare();
        let mut redirects = 0;

        let response = loop {
            let response = self.client.transport.execute(&hop).await?;
            if !utils::is_redirect_status(response.status()) {
                break response;
            }
            let Some(location) = response.location() else {
                break response;
            };
            if redirects >= self.max_redirects {
                return Err(Error::TooManyRedirects(self.max_redirects));
            }
            redirects += 1;
            let next = follow(&hop, response.status(), location)?;
            tracing::debug!(
                status = response.status(),
                from = %hop.url,
                to = %next.url,
                "following redirect"
            );
            hop = next;
        };

        if utils::is_error_status(response.status()) && !self.allow_error_status {
            return Err(Error::HttpStatus {
                status: response.status(),
                body: response.text(),
            });
        }
        Ok(response)
    }

    fn prepare(&self) -> PreparedRequest {
        PreparedRequest {
            method: self.method,
            url: self.url(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            timeout: self.timeout,
            insecure: self.insecure,
        }
    }
}

/// The next hop of a redirect chain.
fn follow(hop: &PreparedRequest, status: u16, location: &str) -> Result<PreparedRequest> {
    let url = utils::resolve_location(&hop.url, location)?;
    let method = utils::redirect_method(status, hop.method);

    let mut headers = hop.headers.clone();
    let mut body = hop.body.clone();
    if method != hop.method {
        headers = headers.remove(headers::CONTENT_TYPE);
        body = Bytes::new();
    }
    if url.host_str() != hop.url.host_str() {
        headers = headers.remove(headers::AUTHORIZATION);
    }

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
        timeout: hop.timeout,
        insecure: hop.insecure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays canned outcomes and records every hop it was asked to send.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<Response>>>,
        seen: Mutex<Vec<PreparedRequest>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<Result<Response>>) -> Arc<Self> {
            Arc::new(ScriptedTransport {
                outcomes: Mutex::new(outcomes.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        fn kind(&self) -> TransportKind {
            TransportKind::Modern
        }

        async fn execute(&self, request: &PreparedRequest) -> Result<Response> {
            self.seen.lock().push(request.clone());
            self.outcomes
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("script exhausted".into())))
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> Client {
        Client::with_transport(transport, ClientConfig::default()).unwrap()
    }

    fn redirect(status: u16, location: &str) -> Response {
        Response::new(status).with_header("Location", location).unwrap()
    }

    #[test]
    fn test_construction_rejects_bad_urls() {
        let client = client(ScriptedTransport::new(vec![]));
        assert!(matches!(client.get("/relative"), Err(Error::InvalidUrl(_))));
        assert!(matches!(client.get("ftp://host/file"), Err(Error::InvalidUrl(_))));
        assert!(client.get("http://host/path").is_ok());
    }

    #[test]
    fn test_constructors_validate_config() {
        let zero_timeout = ClientConfig { request_timeout_ms: 0, ..Default::default() };
        assert!(matches!(Client::with_config(zero_timeout.clone()), Err(Error::Config(_))));
        assert!(matches!(
            Client::with_transport(ScriptedTransport::new(vec![]), zero_timeout),
            Err(Error::Config(_))
        ));

        let zero_attempts = ClientConfig { attempts: 0, ..Default::default() };
        assert!(matches!(Client::with_config(zero_attempts), Err(Error::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let request = client(ScriptedTransport::new(vec![])).get("https://host/").unwrap();
        assert_eq!(request.attempts(), 2);
        assert_eq!(request.timeout(), Duration::from_secs(30));
        assert!(!request.allow_error_status);
        assert!(!request.insecure);
    }

    #[test]
    fn test_url_query_is_parsed_for_lookups() {
        let request = client(ScriptedTransport::new(vec![]))
            .get("http://host/search?q=rust#frag")
            .unwrap();
        assert_eq!(request.query().get("q"), Some("rust"));
        assert!(matches!(
            request.clone().with_query_param("q", "again"),
            Err(Error::DuplicateParameter(name)) if name == "q"
        ));
        let request = request.with_query_param("page", "2").unwrap();
        assert_eq!(request.url().as_str(), "http://host/search?q=rust&page=2");
    }

    #[test]
    fn test_caller_query_is_sent_verbatim() {
        let client = client(ScriptedTransport::new(vec![]));
        for raw in [
            "http://host/x?flag",
            "http://host/x?token=%FF",
            "http://host/x?a=1;b=2",
            "http://host/x?a=b=c&&d",
            "http://host/x?",
        ] {
            assert_eq!(client.get(raw).unwrap().url().as_str(), raw);
        }

        let request = client
            .get("http://host/x?flag&token=%FF")
            .unwrap()
            .with_query_param("page", "two words")
            .unwrap();
        assert_eq!(request.url().as_str(), "http://host/x?flag&token=%FF&page=two%20words");

        let request = client.get("http://host/x?").unwrap().with_query_param("page", "1").unwrap();
        assert_eq!(request.url().as_str(), "http://host/x?page=1");
        assert_eq!(client.get("http://host/x").unwrap().url().as_str(), "http://host/x");
    }

    #[tokio::test]
    async fn test_valueless_query_reaches_transport() {
        let transport = ScriptedTransport::new(vec![Ok(Response::ok())]);
        client(transport.clone()).get("http://host/x?flag").unwrap().send().await.unwrap();
        assert_eq!(transport.seen.lock()[0].url.query(), Some("flag"));
    }

    #[test]
    fn test_builder_headers() {
        let request = client(ScriptedTransport::new(vec![]))
            .post("http://host/")
            .unwrap()
            .with_header("X-Tag", "a", false)
            .unwrap()
            .with_header("x-tag", "b", false)
            .unwrap()
            .with_body("{}", "application/json")
            .unwrap()
            .with_body("[]", "application/json; v=2")
            .unwrap()
            .with_basic_auth("user", "pass")
            .unwrap();

        assert_eq!(request.headers().get_all("X-Tag"), vec!["a", "b"]);
        assert_eq!(request.headers().get_all("Content-Type"), vec!["application/json; v=2"]);
        assert_eq!(request.headers().get("authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(request.body().as_ref(), b"[]");

        let replaced = request.with_header("X-Tag", "c", true).unwrap();
        assert_eq!(replaced.headers().get_all("x-tag"), vec!["c"]);
    }

    #[test]
    fn test_builder_rejects_invalid_header() {
        let request = client(ScriptedTransport::new(vec![])).get("http://host/").unwrap();
        assert!(matches!(
            request.with_header("X-Bad", "a\r\nb", false),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_form_body() {
        let form = FormParameters::from_pairs([("name", "Jane Doe")]).unwrap();
        let request = client(ScriptedTransport::new(vec![]))
            .post("http://host/")
            .unwrap()
            .with_form(&form)
            .unwrap();
        assert_eq!(request.body().as_ref(), b"name=Jane%20Doe");
        assert_eq!(
            request.headers().get("Content-Type"),
            Some("application/x-www-form-urlencoded; charset=UTF-8")
        );
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let transport = ScriptedTransport::new(vec![
            Err(Error::Transport("connection reset".into())),
            Ok(Response::new(503)),
            Ok(Response::ok().with_text("done")),
        ]);
        let response = client(transport.clone())
            .get("http://host/")
            .unwrap()
            .with_attempts(3)
            .send()
            .await
            .unwrap();
        assert_eq!(response.text(), "done");
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_wrap_last_failure() {
        let transport = ScriptedTransport::new(vec![
            Err(Error::Transport("refused".into())),
            Ok(Response::new(500).with_text("boom")),
        ]);
        let err = client(transport.clone()).get("http://host/").unwrap().send().await.unwrap_err();
        match err {
            Error::RequestFailed { attempts, source } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*source, Error::HttpStatus { status: 500, ref body } if body == "boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_allow_error_status_returns_response() {
        let transport = ScriptedTransport::new(vec![Ok(Response::new(404))]);
        let response = client(transport.clone())
            .get("http://host/missing")
            .unwrap()
            .allow_error_status()
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_follows_redirects() {
        let transport = ScriptedTransport::new(vec![
            Ok(redirect(302, "/step2")),
            Ok(redirect(307, "http://host/final")),
            Ok(Response::ok().with_text("arrived")),
        ]);
        let response = client(transport.clone()).get("http://host/start").unwrap().send().await.unwrap();
        assert_eq!(response.text(), "arrived");

        let seen = transport.seen.lock();
        let urls: Vec<_> = seen.iter().map(|r| r.url.as_str().to_string()).collect();
        assert_eq!(urls, vec!["http://host/start", "http://host/step2", "http://host/final"]);
    }

    #[tokio::test]
    async fn test_redirect_without_location_is_returned() {
        let transport = ScriptedTransport::new(vec![Ok(Response::new(302))]);
        let response = client(transport).get("http://host/").unwrap().send().await.unwrap();
        assert_eq!(response.status(), 302);
    }

    #[tokio::test]
    async fn test_see_other_switches_to_get() {
        let transport = ScriptedTransport::new(vec![Ok(redirect(303, "/result")), Ok(Response::ok())]);
        client(transport.clone())
            .post("http://host/submit")
            .unwrap()
            .with_body("payload", "text/plain")
            .unwrap()
            .send()
            .await
            .unwrap();

        let seen = transport.seen.lock();
        assert_eq!(seen[1].method, Method::Get);
        assert!(seen[1].body.is_empty());
        assert!(!seen[1].headers.contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_cross_host_redirect_drops_authorization() {
        let transport = ScriptedTransport::new(vec![
            Ok(redirect(302, "https://elsewhere.example/")),
            Ok(Response::ok()),
        ]);
        client(transport.clone())
            .get("http://host/")
            .unwrap()
            .with_bearer_auth("token")
            .unwrap()
            .send()
            .await
            .unwrap();

        let seen = transport.seen.lock();
        assert!(seen[0].headers.contains("Authorization"));
        assert!(!seen[1].headers.contains("Authorization"));
    }

    #[tokio::test]
    async fn test_redirect_limit() {
        let transport = ScriptedTransport::new(vec![
            Ok(redirect(301, "/a")),
            Ok(redirect(301, "/b")),
            Ok(redirect(301, "/c")),
        ]);
        let err = client(transport)
            .get("http://host/")
            .unwrap()
            .with_attempts(1)
            .with_max_redirects(2)
            .send()
            .await
            .unwrap_err();
        match err {
            Error::RequestFailed { source, .. } => assert!(matches!(*source, Error::TooManyRedirects(2))),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insecure_flag_reaches_transport() {
        let transport = ScriptedTransport::new(vec![Ok(Response::ok())]);
        client(transport.clone())
            .get("https://self-signed.local/")
            .unwrap()
            .disable_certificate_validation()
            .send()
            .await
            .unwrap();
        assert!(transport.seen.lock()[0].insecure);
    }

    #[tokio::test]
    async fn test_send_blocking_refuses_inside_runtime() {
        let request = client(ScriptedTransport::new(vec![])).get("http://host/").unwrap();
        assert!(matches!(request.send_blocking(), Err(Error::Runtime(_))));
    }

    #[test]
    fn test_send_blocking_outside_runtime() {
        let transport = ScriptedTransport::new(vec![Ok(Response::new(204))]);
        let response = client(transport).get("http://host/").unwrap().send_blocking().unwrap();
        assert_eq!(response.status(), 204);
    }
}
