//! Inbound REST routing.
//!
//! Routes are registered explicitly as (method, path template, authorization
//! tag, handler). Dispatch maps every request to exactly one outcome: the
//! handler's response, a CORS preflight, or a 400/401/404/405/500 status.
//!
//! # Module Organization
//!
//! ```text
//! server/
//! ├── path    - PathTemplate parsing and segment matching
//! ├── handler - Handler/Authorizer traits, BoundRequest, BadRequest
//! ├── router  - Router, the route table and dispatch
//! ├── config  - ServerConfig
//! └── adapter - RouterService, hosting a Router in axum
//! ```
//!
//! # Examples
//!
//! ```
//! use routewire::server::{handler_fn, BoundRequest, InboundRequest, Outcome, Router};
//! use routewire::{Method, Response};
//!
//! # tokio_test::block_on(async {
//! let router = Router::new();
//! router.any("/ping", "", handler_fn(|_: BoundRequest| async { Ok(Response::ok()) }))?;
//!
//! let dispatch = router.dispatch(InboundRequest::new(Method::Options, "/ping")).await;
//! assert_eq!(dispatch.outcome, Outcome::Preflight);
//! assert_eq!(dispatch.response.header("Access-Control-Allow-Origin"), Some("*"));
//! # Ok::<(), routewire::Error>(())
//! # })?;
//! # Ok::<(), routewire::Error>(())
//! ```

mod adapter;
mod config;
mod handler;
mod path;
mod router;

pub use adapter::{into_axum_response, RouterService};
pub use config::ServerConfig;
pub use handler::{
    authorizer_fn, handler_fn, is_bad_request, AllowAll, Authorizer, BadRequest, BoundRequest,
    FnAuthorizer, FnHandler, Handler, InboundRequest,
};
pub use path::{split_path, PathTemplate, Segment};
pub use router::{Dispatch, Outcome, Route, RouteInfo, Router};
