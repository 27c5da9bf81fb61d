//! Hosting a [`Router`] in axum.
//!
//! [`RouterService`] is a `tower::Service` over axum requests. It collects
//! the body (bounded by [`ServerConfig::max_body_bytes`]), dispatches, logs
//! handler failures and converts the result back to an axum response.
//!
//! # Usage
//!
//! ```ignore
//! use routewire::server::{handler_fn, BoundRequest, Router};
//! use routewire::Response;
//!
//! let router = Router::new();
//! router.get("/health", "", handler_fn(|_: BoundRequest| async { Ok(Response::ok()) }))?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, router.into_axum()).await?;
//! ```

use super::config::ServerConfig;
use super::handler::InboundRequest;
use super::router::{Outcome, Router};
use crate::types::{HeaderSet, Method, Response};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use futures::future::BoxFuture;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

impl Router {
    /// An axum app that sends every request through this router.
    pub fn into_axum(self) -> axum::Router {
        self.into_axum_with_config(ServerConfig::default())
    }

    pub fn into_axum_with_config(self, config: ServerConfig) -> axum::Router {
        RouterService::new(Arc::new(self), config).into_axum()
    }
}

/// `tower::Service` answering axum requests from a shared [`Router`].
///
/// Holding the `Arc<Router>` elsewhere allows registering routes after the
/// service is built.
#[derive(Clone, Debug)]
pub struct RouterService {
    router: Arc<Router>,
    config: Arc<ServerConfig>,
}

impl RouterService {
    pub fn new(router: Arc<Router>, config: ServerConfig) -> Self {
        RouterService {
            router,
            config: Arc::new(config),
        }
    }

    /// Mount as the fallback of an empty axum app.
    pub fn into_axum(self) -> axum::Router {
        axum::Router::new().fallback_service(self)
    }

    /// Dispatch one axum request.
    pub async fn handle(&self, request: Request) -> axum::response::Response {
        let (parts, body) = request.into_parts();

        let Ok(method) = Method::try_from(&parts.method) else {
            tracing::debug!(method = %parts.method, "unsupported method");
            return into_axum_response(self.router.dispatch_unsupported_method(parts.uri.path()).response);
        };

        // Fails on the length limit or a broken connection; the body is
        // unusable either way.
        let body = match axum::body::to_bytes(body, self.config.max_body_bytes).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, limit = self.config.max_body_bytes, "request body rejected");
                return into_axum_response(self.router.status_response(413));
            }
        };

        let target = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
        let inbound = InboundRequest::new(method, target)
            .with_headers(HeaderSet::from_header_map(&parts.headers))
            .with_body(body);

        let dispatch = self.router.dispatch(inbound).await;
        if let Some(error) = &dispatch.error {
            match dispatch.outcome {
                Outcome::InternalError if self.config.log_handler_errors => {
                    tracing::error!(%method, path = parts.uri.path(), error = ?error, "handler failed");
                }
                _ => tracing::debug!(%method, path = parts.uri.path(), error = %error, "handler rejected request"),
            }
        }

        into_axum_response(dispatch.response)
    }
}

impl tower::Service<Request> for RouterService {
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(request).await) })
    }
}

/// Convert a router response to an axum response.
pub fn into_axum_response(response: Response) -> axum::response::Response {
    let status = StatusCode::from_u16(response.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut out = axum::response::Response::new(Body::from(response.body().clone()));
    *out.status_mut() = status;
    *out.headers_mut() = response.headers().to_header_map();
    out
}
