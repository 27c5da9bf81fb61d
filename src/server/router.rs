//! Route table and request dispatch.
//!
//! [`Router::dispatch`] decides every outcome in a fixed order:
//!
//! 1. No route template matches the path: **404**.
//! 2. The method is `OPTIONS`: **200** preflight with the default CORS
//!    headers. No handler runs.
//! 3. No route for the method and no any-method route: **405**, with an
//!    `Allow` header.
//! 4. Path values are bound into a [`BoundRequest`].
//! 5. The [`Authorizer`] rejects the request: **401**.
//! 6. The handler fails with a [`BadRequest`](super::BadRequest) in its
//!    cause chain: **400**. It fails any other way, or panics: **500**.
//! 7. Otherwise the handler's response is returned with its headers layered
//!    over the defaults.
//!
//! The router never logs handler failures. They come back in
//! [`Dispatch::error`] for the host to report.

use super::handler::{is_bad_request, AllowAll, Authorizer, BoundRequest, Handler, InboundRequest};
use super::path::{split_path, PathTemplate, Segment};
use crate::error::{Error, Result};
use crate::protocol::constants::{headers, DEFAULT_RESPONSE_HEADERS};
use crate::types::{HeaderSet, Method, Response};
use futures::FutureExt;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// A registered route.
pub struct Route {
    method: Option<Method>,
    template: PathTemplate,
    auth_tag: String,
    handler: Arc<dyn Handler>,
}

impl Route {
    /// `None` accepts any method.
    pub fn method(&self) -> Option<Method> {
        self.method
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn auth_tag(&self) -> &str {
        &self.auth_tag
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .field("auth_tag", &self.auth_tag)
            .finish_non_exhaustive()
    }
}

/// A route as listed by [`Router::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Option<Method>,
    pub template: String,
    pub auth_tag: String,
}

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler produced the response.
    Handled,
    /// `OPTIONS` answered without a handler.
    Preflight,
    NotFound,
    MethodNotAllowed,
    Unauthorized,
    BadRequest,
    InternalError,
}

/// Result of dispatching one request.
#[derive(Debug)]
pub struct Dispatch {
    pub response: Response,
    pub outcome: Outcome,
    /// The handler's failure, for [`Outcome::BadRequest`] and
    /// [`Outcome::InternalError`].
    pub error: Option<anyhow::Error>,
}

/// Inbound request router.
///
/// Registration and dispatch may run concurrently. The table is replaced
/// wholesale on each registration and dispatch works on a snapshot, so no
/// lock is held while a handler runs.
///
/// # Examples
///
/// ```
/// use routewire::server::{handler_fn, BoundRequest, InboundRequest, Router};
/// use routewire::{Method, Response};
///
/// # tokio_test::block_on(async {
/// let router = Router::new();
/// router.get("/users/{id}", "user", handler_fn(|request: BoundRequest| async move {
///     Ok(Response::ok().with_text(request.require_param("id")?))
/// }))?;
///
/// let dispatch = router.dispatch(InboundRequest::new(Method::Get, "/users/42")).await;
/// assert_eq!(dispatch.response.status(), 200);
/// assert_eq!(dispatch.response.text(), "42");
///
/// let dispatch = router.dispatch(InboundRequest::new(Method::Post, "/users/42")).await;
/// assert_eq!(dispatch.response.status(), 405);
/// # Ok::<(), routewire::Error>(())
/// # })?;
/// # Ok::<(), routewire::Error>(())
/// ```
pub struct Router {
    routes: RwLock<Arc<Vec<Arc<Route>>>>,
    authorizer: Arc<dyn Authorizer>,
    default_headers: HeaderSet,
}

impl Router {
    /// A router that admits every request.
    pub fn new() -> Self {
        Self::with_authorizer(Arc::new(AllowAll))
    }

    /// A router that consults `authorizer` before running handlers.
    pub fn with_authorizer(authorizer: Arc<dyn Authorizer>) -> Self {
        let default_headers = HeaderSet::from_wire(
            DEFAULT_RESPONSE_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        Router {
            routes: RwLock::new(Arc::new(Vec::new())),
            authorizer,
            default_headers,
        }
    }

    /// Register a route. `method` of `None` accepts any method.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRoute`] if the template does not parse
    /// - [`Error::RouteConflict`] if a route with the same method and an
    ///   equivalent template exists
    pub fn register<H>(&self, method: Option<Method>, template: &str, auth_tag: &str, handler: H) -> Result<()>
    where
        H: Handler + 'static,
    {
        let template = PathTemplate::parse(template)?;
        let mut routes = self.routes.write();

        if let Some(existing) = routes
            .iter()
            .find(|r| r.method == method && r.template.is_equivalent(&template))
        {
            tracing::debug!(
                method = method_label(method),
                template = %template,
                existing = %existing.template,
                "route conflict"
            );
            return Err(Error::RouteConflict {
                method: method_label(method).to_string(),
                template: template.to_string(),
            });
        }

        tracing::debug!(method = method_label(method), template = %template, auth_tag, "registered route");

        let mut next = Vec::with_capacity(routes.len() + 1);
        next.extend(routes.iter().cloned());
        next.push(Arc::new(Route {
            method,
            template,
            auth_tag: auth_tag.to_string(),
            handler: Arc::new(handler),
        }));
        *routes = Arc::new(next);
        Ok(())
    }

    pub fn get<H: Handler + 'static>(&self, template: &str, auth_tag: &str, handler: H) -> Result<()> {
        self.register(Some(Method::Get), template, auth_tag, handler)
    }

    pub fn post<H: Handler + 'static>(&self, template: &str, auth_tag: &str, handler: H) -> Result<()> {
        self.register(Some(Method::Post), template, auth_tag, handler)
    }

    pub fn put<H: Handler + 'static>(&self, template: &str, auth_tag: &str, handler: H) -> Result<()> {
        self.register(Some(Method::Put), template, auth_tag, handler)
    }

    pub fn delete<H: Handler + 'static>(&self, template: &str, auth_tag: &str, handler: H) -> Result<()> {
        self.register(Some(Method::Delete), template, auth_tag, handler)
    }

    pub fn patch<H: Handler + 'static>(&self, template: &str, auth_tag: &str, handler: H) -> Result<()> {
        self.register(Some(Method::Patch), template, auth_tag, handler)
    }

    /// Register a route accepting any method without a route of its own.
    pub fn any<H: Handler + 'static>(&self, template: &str, auth_tag: &str, handler: H) -> Result<()> {
        self.register(None, template, auth_tag, handler)
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.snapshot()
            .iter()
            .map(|r| RouteInfo {
                method: r.method,
                template: r.template.to_string(),
                auth_tag: r.auth_tag.clone(),
            })
            .collect()
    }

    /// Headers every response carries unless the handler overrides them.
    pub fn default_headers(&self) -> &HeaderSet {
        &self.default_headers
    }

    /// Route one request. See the module docs for the order of checks.
    pub async fn dispatch(&self, request: InboundRequest) -> Dispatch {
        let routes = self.snapshot();
        let raw_segments: Vec<String> = split_path(&request.path)
            .into_iter()
            .map(str::to_string)
            .collect();
        let candidates = matching_routes(&routes, &raw_segments);

        if candidates.is_empty() {
            tracing::trace!(method = %request.method, path = %request.path, "no matching route");
            return self.reject(Outcome::NotFound, 404);
        }

        if request.method == Method::Options {
            tracing::trace!(path = %request.path, "preflight");
            return self.reject(Outcome::Preflight, 200);
        }

        let route = candidates
            .iter()
            .find(|r| r.method == Some(request.method))
            .or_else(|| candidates.iter().find(|r| r.method.is_none()))
            .map(|r| Arc::clone(r));

        let Some(route) = route else {
            tracing::trace!(method = %request.method, path = %request.path, "method not allowed");
            return self.method_not_allowed(&candidates);
        };

        let params = route.template.extract(&request.path);
        let bound = BoundRequest::new(
            request,
            route.template.to_string(),
            route.auth_tag.clone(),
            raw_segments,
            params,
        );

        if !self.authorizer.authorize(&bound, &route.auth_tag).await {
            tracing::trace!(template = %route.template, auth_tag = %route.auth_tag, "unauthorized");
            return self.reject(Outcome::Unauthorized, 401);
        }

        match AssertUnwindSafe(route.handler.call(bound)).catch_unwind().await {
            Ok(Ok(response)) => Dispatch {
                response: self.finish(response),
                outcome: Outcome::Handled,
                error: None,
            },
            Ok(Err(error)) if is_bad_request(&error) => self.fail(Outcome::BadRequest, 400, error),
            Ok(Err(error)) => self.fail(Outcome::InternalError, 500, error),
            Err(panic) => {
                let error = anyhow::anyhow!("handler panicked: {}", panic_message(&*panic));
                self.fail(Outcome::InternalError, 500, error)
            }
        }
    }

    /// Answer a request whose method the router cannot represent.
    ///
    /// Path lookup still comes first: 404 when no template matches `path`,
    /// otherwise 405 listing the methods registered for it.
    pub fn dispatch_unsupported_method(&self, path: &str) -> Dispatch {
        let routes = self.snapshot();
        let raw_segments: Vec<String> = split_path(path).into_iter().map(str::to_string).collect();
        let candidates = matching_routes(&routes, &raw_segments);
        if candidates.is_empty() {
            return self.reject(Outcome::NotFound, 404);
        }
        self.method_not_allowed(&candidates)
    }

    /// A response for `status` with a plain-text reason phrase and the
    /// default headers.
    pub fn status_response(&self, status: u16) -> Response {
        let response = Response::new(status);
        let reason = response.reason().unwrap_or("Unknown Status");
        self.finish(response.with_text(reason))
    }

    fn snapshot(&self) -> Arc<Vec<Arc<Route>>> {
        self.routes.read().clone()
    }

    fn finish(&self, response: Response) -> Response {
        let headers = response.headers().merge_over(&self.default_headers);
        response.with_headers(headers)
    }

    fn method_not_allowed(&self, candidates: &[&Arc<Route>]) -> Dispatch {
        let mut dispatch = self.reject(Outcome::MethodNotAllowed, 405);
        if let Ok(headers) = dispatch.response.headers().replace(headers::ALLOW, allowed_methods(candidates)) {
            dispatch.response = dispatch.response.with_headers(headers);
        }
        dispatch
    }

    fn reject(&self, outcome: Outcome, status: u16) -> Dispatch {
        Dispatch {
            response: self.status_response(status),
            outcome,
            error: None,
        }
    }

    fn fail(&self, outcome: Outcome, status: u16, error: anyhow::Error) -> Dispatch {
        Dispatch {
            response: self.status_response(status),
            outcome,
            error: Some(error),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.snapshot())
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

fn matching_routes<'a>(routes: &'a [Arc<Route>], raw_segments: &[String]) -> Vec<&'a Arc<Route>> {
    let incoming: Vec<Segment> = raw_segments.iter().map(|s| Segment::parse(s)).collect();
    routes
        .iter()
        .filter(|r| r.template.matches_segments(&incoming))
        .collect()
}

fn method_label(method: Option<Method>) -> &'static str {
    method.map_or("*", Method::as_str)
}

fn allowed_methods(candidates: &[&Arc<Route>]) -> String {
    let mut methods: Vec<Method> = candidates.iter().filter_map(|r| r.method).collect();
    methods.push(Method::Options);
    methods.sort();
    methods.dedup();
    methods.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{authorizer_fn, handler_fn, BadRequest};
    use anyhow::Context;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts invocations and answers with a fixed body.
    #[derive(Debug, Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Handler for CountingHandler {
        async fn call(&self, request: BoundRequest) -> anyhow::Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Response::ok().with_text(&format!("{} {}", request.method(), request.template())))
        }
    }

    fn echo_id() -> impl Handler {
        handler_fn(|request: BoundRequest| async move {
            Ok(Response::ok().with_text(request.require_param("id")?))
        })
    }

    async fn send(router: &Router, method: Method, target: &str) -> Dispatch {
        router.dispatch(InboundRequest::new(method, target)).await
    }

    #[test]
    fn test_equivalent_templates_conflict() {
        let router = Router::new();
        router.get("/a/{id}", "", echo_id()).unwrap();
        let err = router.get("/a/{other}", "", echo_id()).unwrap_err();
        assert!(matches!(err, Error::RouteConflict { ref method, .. } if method == "GET"));
        assert!(router.get("/a/:x/", "", echo_id()).is_err());

        // Different methods and any-method routes coexist.
        router.post("/a/{other}", "", echo_id()).unwrap();
        router.any("/a/{other}", "", echo_id()).unwrap();
        assert!(router.any("/a/@x", "", echo_id()).is_err());
        assert_eq!(router.routes().len(), 3);
    }

    #[test]
    fn test_unsupported_method_looks_up_path_first() {
        let router = Router::new();
        router.get("/users/{id}", "", echo_id()).unwrap();
        router.put("/users/{id}", "", echo_id()).unwrap();

        let missing = router.dispatch_unsupported_method("/nope");
        assert_eq!(missing.outcome, Outcome::NotFound);
        assert_eq!(missing.response.status(), 404);

        let known = router.dispatch_unsupported_method("/users/7");
        assert_eq!(known.outcome, Outcome::MethodNotAllowed);
        assert_eq!(known.response.header("Allow"), Some("GET, PUT, OPTIONS"));
    }

    #[test]
    fn test_register_rejects_relative_template() {
        let router = Router::new();
        assert!(matches!(router.get("users", "", echo_id()), Err(Error::InvalidRoute(_))));
        assert!(router.routes().is_empty());
    }

    #[tokio::test]
    async fn test_bind_405_and_404() {
        let router = Router::new();
        router.get("/users/{id}", "", echo_id()).unwrap();

        let ok = send(&router, Method::Get, "/users/42").await;
        assert_eq!(ok.outcome, Outcome::Handled);
        assert_eq!(ok.response.text(), "42");

        let wrong_method = send(&router, Method::Post, "/users/42").await;
        assert_eq!(wrong_method.response.status(), 405);
        assert_eq!(wrong_method.response.header("allow"), Some("GET, OPTIONS"));

        let extra = send(&router, Method::Get, "/users/42/extra").await;
        assert_eq!(extra.response.status(), 404);
        assert_eq!(extra.outcome, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_trailing_slash_and_query_are_ignored() {
        let router = Router::new();
        router.get("/users/{id}/", "", echo_id()).unwrap();
        let dispatch = send(&router, Method::Get, "/users/7/?verbose=1").await;
        assert_eq!(dispatch.response.status(), 200);
        assert_eq!(dispatch.response.text(), "7");
    }

    #[tokio::test]
    async fn test_options_is_preflight_without_handler() {
        let router = Router::new();
        let handler = Arc::new(CountingHandler::default());
        router.get("/items", "", handler.clone()).unwrap();

        let dispatch = send(&router, Method::Options, "/items").await;
        assert_eq!(dispatch.outcome, Outcome::Preflight);
        assert_eq!(dispatch.response.status(), 200);
        for (name, value) in DEFAULT_RESPONSE_HEADERS {
            assert_eq!(dispatch.response.header(name), Some(value));
        }
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exact_method_wins_over_any() {
        let router = Router::new();
        let exact = Arc::new(CountingHandler::default());
        let fallback = Arc::new(CountingHandler::default());
        router.get("/items", "", exact.clone()).unwrap();
        router.any("/items", "", fallback.clone()).unwrap();

        assert_eq!(send(&router, Method::Get, "/items").await.response.text(), "GET /items");
        assert_eq!(send(&router, Method::Delete, "/items").await.response.status(), 200);
        assert_eq!(exact.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_authorizer_receives_route_tag() {
        let router = Router::with_authorizer(Arc::new(authorizer_fn(|request: &BoundRequest, tag: &str| {
            tag.is_empty() || request.header("x-role") == Some(tag)
        })));
        let handler = Arc::new(CountingHandler::default());
        router.delete("/users/{id}", "admin", handler.clone()).unwrap();

        let denied = send(&router, Method::Delete, "/users/1").await;
        assert_eq!(denied.response.status(), 401);
        assert_eq!(denied.outcome, Outcome::Unauthorized);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);

        let request = InboundRequest::new(Method::Delete, "/users/1")
            .with_headers(HeaderSet::new().append("X-Role", "admin").unwrap());
        assert_eq!(router.dispatch(request).await.response.status(), 200);
    }

    #[tokio::test]
    async fn test_handler_errors_are_classified() {
        let router = Router::new();
        router
            .post("/parse", "", handler_fn(|_request: BoundRequest| async move {
                let parsed: anyhow::Result<u32> = Err(BadRequest::new("not a number")).context("reading body");
                Ok(Response::new(201).with_text(&parsed?.to_string()))
            }))
            .unwrap();
        router
            .post("/fail", "", handler_fn(|_request: BoundRequest| async move {
                Err::<Response, _>(anyhow::anyhow!("database unavailable"))
            }))
            .unwrap();

        let bad = send(&router, Method::Post, "/parse").await;
        assert_eq!(bad.response.status(), 400);
        assert_eq!(bad.outcome, Outcome::BadRequest);
        assert!(bad.error.is_some());

        let failed = send(&router, Method::Post, "/fail").await;
        assert_eq!(failed.response.status(), 500);
        assert_eq!(failed.response.text(), "Internal Server Error");
        assert_eq!(failed.error.unwrap().to_string(), "database unavailable");
    }

    #[tokio::test]
    async fn test_panicking_handler_is_internal_error() {
        let router = Router::new();
        router
            .get("/boom", "", handler_fn(|_request: BoundRequest| async move {
                if true {
                    panic!("boom");
                }
                Ok(Response::ok())
            }))
            .unwrap();

        let dispatch = send(&router, Method::Get, "/boom").await;
        assert_eq!(dispatch.response.status(), 500);
        assert!(dispatch.error.unwrap().to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_handler_headers_override_defaults() {
        let router = Router::new();
        router
            .get("/cached", "", handler_fn(|_request: BoundRequest| async move {
                Ok(Response::ok().with_header("Cache-Control", "max-age=60")?)
            }))
            .unwrap();

        let response = send(&router, Method::Get, "/cached").await.response;
        assert_eq!(response.headers().get_all("cache-control"), vec!["max-age=60"]);
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_concurrent_registration() {
        let router = Router::new();
        std::thread::scope(|scope| {
            for i in 0..8 {
                let router = &router;
                scope.spawn(move || router.get(&format!("/r{}", i), "", echo_id()).unwrap());
            }
        });
        assert_eq!(router.routes().len(), 8);
    }
}
