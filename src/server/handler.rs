//! Handler and authorization seams for the router.
//!
//! A [`Handler`] receives a [`BoundRequest`] (the incoming request plus the
//! values bound from its path) and returns an `anyhow::Result<Response>`.
//! Returning an error whose cause chain contains a [`BadRequest`] yields a
//! 400; any other error yields a 500.
//!
//! Closures become handlers and authorizers through [`handler_fn`] and
//! [`authorizer_fn`]:
//!
//! ```
//! use routewire::server::{handler_fn, BadRequest, BoundRequest};
//! use routewire::Response;
//!
//! let handler = handler_fn(|request: BoundRequest| async move {
//!     let id: u64 = request
//!         .param("id")
//!         .and_then(|id| id.parse().ok())
//!         .ok_or_else(|| BadRequest::new("id must be a number"))?;
//!     Ok(Response::ok().with_text(&format!("user {}", id)))
//! });
//! # let _ = handler;
//! ```

use crate::types::{FormParameters, HeaderSet, Method, Response};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::future::Future;

/// A request as it reaches the router.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    pub query: FormParameters,
    pub headers: HeaderSet,
    pub body: Bytes,
}

impl InboundRequest {
    /// Build from a method and a request target such as `/users/42?full=1`.
    ///
    /// The query string is parsed as UTF-8 form data.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, FormParameters::parse(query, Default::default())),
            None => (target, FormParameters::empty()),
        };
        InboundRequest {
            method,
            path: path.to_string(),
            query,
            headers: HeaderSet::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// An inbound request matched to a route, with its path values bound.
#[derive(Debug, Clone)]
pub struct BoundRequest {
    request: InboundRequest,
    template: String,
    auth_tag: String,
    segments: Vec<String>,
    params: BTreeMap<String, String>,
}

impl BoundRequest {
    pub(crate) fn new(
        request: InboundRequest,
        template: String,
        auth_tag: String,
        segments: Vec<String>,
        params: BTreeMap<String, String>,
    ) -> Self {
        BoundRequest {
            request,
            template,
            auth_tag,
            segments,
            params,
        }
    }

    /// Value bound to a path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Value bound to a path parameter, or a [`BadRequest`] naming it.
    pub fn require_param(&self, name: &str) -> Result<&str, BadRequest> {
        self.param(name)
            .ok_or_else(|| BadRequest::new(format!("missing path parameter {:?}", name)))
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Path segments in order, as received.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Template of the matched route.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Authorization tag of the matched route.
    pub fn auth_tag(&self) -> &str {
        &self.auth_tag
    }

    pub fn method(&self) -> Method {
        self.request.method
    }

    pub fn path(&self) -> &str {
        &self.request.path
    }

    pub fn query(&self) -> &FormParameters {
        &self.request.query
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers.get(name)
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.request.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.request.body
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.request.body).into_owned()
    }

    /// Body parsed as JSON; a parse failure is a [`BadRequest`].
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, BadRequest> {
        serde_json::from_slice(&self.request.body)
            .map_err(|e| BadRequest::new(format!("invalid JSON body: {}", e)))
    }

    /// The underlying inbound request.
    pub fn request(&self) -> &InboundRequest {
        &self.request
    }
}

/// Marks a handler failure as the caller's fault (HTTP 400).
///
/// The router looks for this type anywhere in the error's cause chain, so it
/// still classifies after `.context(..)` or when wrapped as another error's
/// source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bad request: {message}")]
pub struct BadRequest {
    message: String,
}

impl BadRequest {
    pub fn new(message: impl Into<String>) -> Self {
        BadRequest {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Whether a handler error is a bad-request condition.
pub fn is_bad_request(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<BadRequest>())
}

/// Application logic bound to a route.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: BoundRequest) -> anyhow::Result<Response>;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for std::sync::Arc<H> {
    async fn call(&self, request: BoundRequest) -> anyhow::Result<Response> {
        (**self).call(request).await
    }
}

/// Decides whether a bound request may reach its handler.
///
/// Receives the route's authorization tag; what the tag means is up to the
/// implementation.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, request: &BoundRequest, auth_tag: &str) -> bool;
}

/// Authorizer that admits every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl Authorizer for AllowAll {
    async fn authorize(&self, _request: &BoundRequest, _auth_tag: &str) -> bool {
        true
    }
}

/// Handler built from an async closure. See [`handler_fn`].
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wrap an async closure as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(BoundRequest) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(BoundRequest) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
{
    async fn call(&self, request: BoundRequest) -> anyhow::Result<Response> {
        (self.f)(request).await
    }
}

/// Authorizer built from a synchronous predicate. See [`authorizer_fn`].
#[derive(Clone)]
pub struct FnAuthorizer<F> {
    f: F,
}

/// Wrap a predicate over the bound request and the route's tag as an
/// [`Authorizer`].
pub fn authorizer_fn<F>(f: F) -> FnAuthorizer<F>
where
    F: Fn(&BoundRequest, &str) -> bool + Send + Sync,
{
    FnAuthorizer { f }
}

#[async_trait]
impl<F> Authorizer for FnAuthorizer<F>
where
    F: Fn(&BoundRequest, &str) -> bool + Send + Sync,
{
    async fn authorize(&self, request: &BoundRequest, auth_tag: &str) -> bool {
        (self.f)(request, auth_tag)
    }
}
