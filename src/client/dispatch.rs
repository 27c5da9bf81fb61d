//! Asynchronous and background sending.
//!
//! [`Request::spawn`](super::Request::spawn) runs one send on its own tokio
//! task with no limit. [`Dispatcher`] is the bounded alternative: it caps how
//! many sends are in flight at once and queues the rest on a semaphore.
//!
//! Neither cancels in-flight work: dropping a [`PendingResponse`] detaches
//! the task, which runs to completion or failure.
//!
//! # Examples
//!
//! ```ignore
//! use routewire::client::{Client, Dispatcher};
//!
//! let client = Client::new();
//! let dispatcher = Dispatcher::new(8);
//!
//! let pending = dispatcher.submit(client.get("https://example.com/a")?);
//! dispatcher.submit_with_callbacks(
//!     client.get("https://example.com/b")?,
//!     |response| println!("got {}", response.status()),
//!     |error| eprintln!("failed: {}", error),
//! );
//! let response = pending.await?;
//! ```

use super::Request;
use crate::error::{Error, Result};
use crate::types::Response;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Handle to a send running on its own task.
///
/// Resolves to the send's result. A panicked or aborted task resolves to
/// [`Error::Runtime`].
#[derive(Debug)]
pub struct PendingResponse {
    handle: JoinHandle<Result<Response>>,
}

impl PendingResponse {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<Response>> + Send + 'static,
    {
        PendingResponse {
            handle: tokio::spawn(future),
        }
    }

    /// Whether the send has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for PendingResponse {
    type Output = Result<Response>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(Error::Runtime(format!("send task failed: {}", e))),
        })
    }
}

/// Runs sends on tokio tasks with a cap on concurrent sends.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl Dispatcher {
    /// A dispatcher allowing `max_in_flight` concurrent sends (at least 1).
    pub fn new(max_in_flight: usize) -> Self {
        let limit = max_in_flight.max(1);
        Dispatcher {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Queue a send and return a handle to its result.
    pub fn submit(&self, request: Request) -> PendingResponse {
        let permits = self.permits.clone();
        PendingResponse::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| Error::Runtime(e.to_string()))?;
            request.send().await
        })
    }

    /// Queue a send and deliver its outcome to one of two callbacks.
    pub fn submit_with_callbacks<S, F>(&self, request: Request, on_response: S, on_failure: F) -> JoinHandle<()>
    where
        S: FnOnce(Response) + Send + 'static,
        F: FnOnce(Error) + Send + 'static,
    {
        let pending = self.submit(request);
        tokio::spawn(async move {
            match pending.await {
                Ok(response) => on_response(response),
                Err(e) => on_failure(e),
            }
        })
    }

    /// Sends currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.limit - self.permits.available_permits()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(16)
    }
}
