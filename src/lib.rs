#![doc = include_str!("../README.md")]

//! ## Module Structure
//!
//! - **[types]** - Shared data model (HeaderSet, FormParameters, Response, Method, Charset)
//! - **[error]** - Error types and result handling
//! - **[client]** - Outbound request builder, transports, retry and redirects
//! - **[server]** - Inbound router, path templates and the axum adapter
//! - **[protocol]** - Header names, defaults, and header-value codecs

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod types;

pub use client::{Client, ClientConfig, Dispatcher, PendingResponse, Request, TransportKind};
pub use error::{Error, Result};
pub use server::{BadRequest, BoundRequest, Handler, InboundRequest, Router, ServerConfig};
pub use types::{Charset, FormParameters, HeaderSet, Method, Response};
