//! Sends request descriptors and delivers their outcome.
//!
//! # Design
//! Every dispatch picks one completion hook up front: the caller's callback,
//! or the sending half of a oneshot channel whose receiving half is returned
//! as a [`Pending`] future. The spawned request task owns its descriptor and
//! its hook, so each outcome is delivered exactly once and only to the call
//! that produced it.
//!
//! The "promise implementation" is the tokio runtime that drives request
//! tasks. One can be configured explicitly; otherwise the runtime the caller
//! is running on is used.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Outcome of one request: the parsed body, or the reason there is none.
pub type ApiResult = Result<Value, ApiError>;

/// Completion callback. Invoked exactly once per dispatch.
pub type Callback = Box<dyn FnOnce(ApiResult) + Send + 'static>;

/// Box a closure as a [`Callback`] argument.
pub fn callback<F>(f: F) -> Option<Callback>
where
    F: FnOnce(ApiResult) + Send + 'static,
{
    Some(Box::new(f))
}

enum Hook {
    Callback(Callback),
    Promise(oneshot::Sender<ApiResult>),
}

impl Hook {
    fn fire(self, result: ApiResult) {
        match self {
            Hook::Callback(callback) => callback(result),
            // Receiver dropped means nobody is waiting; the result is discarded.
            Hook::Promise(tx) => {
                let _ = tx.send(result);
            }
        }
    }
}

/// Owns the hook of one dispatch until it fires.
///
/// If the request task is dropped before completing (for instance because
/// the runtime it was spawned on has shut down), the hook fires with
/// `ApiError::Canceled` instead of being lost.
struct Completion(Option<Hook>);

impl Completion {
    fn new(hook: Hook) -> Self {
        Self(Some(hook))
    }

    fn complete(mut self, result: ApiResult) {
        if let Some(hook) = self.0.take() {
            hook.fire(result);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(hook) = self.0.take() {
            warn!("request task dropped before completing");
            hook.fire(Err(ApiError::Canceled));
        }
    }
}

/// Future returned by a dispatch without a callback.
///
/// The request is already in flight when this is handed out; awaiting it only
/// waits for the outcome. Dropping it does not cancel the request.
#[derive(Debug)]
pub struct Pending {
    rx: oneshot::Receiver<ApiResult>,
}

impl Pending {
    fn channel() -> (oneshot::Sender<ApiResult>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    fn ready(result: ApiResult) -> Self {
        let (tx, pending) = Self::channel();
        let _ = tx.send(result);
        pending
    }
}

impl Future for Pending {
    type Output = ApiResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ApiError::Canceled)))
    }
}

/// Map a raw response to the caller-facing result.
///
/// 2xx bodies are parsed as JSON, with an empty body (e.g. a 201 from adding
/// tracks) becoming `Value::Null`. Any other status is an `ApiError::Http`
/// carrying the status and the untouched body.
pub fn parse_response(response: HttpResponse) -> ApiResult {
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            body: response.body,
        });
    }
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Executes requests on a `Transport` and routes each outcome to one channel.
pub struct Dispatcher<T: Transport> {
    transport: Arc<T>,
    runtime: Option<Handle>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            runtime: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Drive requests on `runtime` instead of whichever runtime the caller
    /// happens to be on.
    pub fn set_promise_implementation(&mut self, runtime: Handle) {
        self.runtime = Some(runtime);
    }

    /// Pin the runtime the calling code is running on.
    ///
    /// Fails immediately with `ApiError::Configuration` when called outside a
    /// tokio runtime.
    pub fn use_current_runtime(&mut self) -> Result<(), ApiError> {
        let runtime = Handle::try_current().map_err(|e| ApiError::Configuration(e.to_string()))?;
        self.runtime = Some(runtime);
        Ok(())
    }

    pub fn clear_promise_implementation(&mut self) {
        self.runtime = None;
    }

    pub fn has_promise_implementation(&self) -> bool {
        self.runtime.is_some()
    }

    fn runtime(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    /// Send `request` and deliver its outcome.
    ///
    /// With a callback the return value is always `None` and the callback
    /// receives the result. Without one, a [`Pending`] is returned as long as
    /// a runtime is available; with no runtime at all the call does nothing
    /// and returns `None`.
    pub fn dispatch(&self, request: HttpRequest, callback: Option<Callback>) -> Option<Pending> {
        let Some(runtime) = self.runtime() else {
            warn!(
                method = %request.method,
                url = %request.full_url(),
                "no async runtime available, request not sent"
            );
            if let Some(callback) = callback {
                callback(Err(ApiError::NoRuntime));
            }
            return None;
        };

        let (completion, pending) = match callback {
            Some(callback) => (Completion::new(Hook::Callback(callback)), None),
            None => {
                let (tx, pending) = Pending::channel();
                (Completion::new(Hook::Promise(tx)), Some(pending))
            }
        };

        debug!(method = %request.method, url = %request.full_url(), "dispatching request");
        let transport = Arc::clone(&self.transport);
        runtime.spawn(async move {
            let result = match transport.send(&request).await {
                Ok(response) => {
                    debug!(status = response.status, url = %request.url, "response received");
                    parse_response(response)
                }
                Err(err) => {
                    warn!(url = %request.url, error = %err, "request failed without a response");
                    Err(err)
                }
            };
            completion.complete(result);
        });
        pending
    }

    /// Deliver a result that was decided before any request was sent, such
    /// as a body that failed to serialize. Follows the same channel rules as
    /// [`Dispatcher::dispatch`].
    pub fn deliver(&self, result: ApiResult, callback: Option<Callback>) -> Option<Pending> {
        match callback {
            Some(callback) => {
                callback(result);
                None
            }
            None => self.runtime().map(|_| Pending::ready(result)),
        }
    }
}
