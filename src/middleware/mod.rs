//! Route middleware chain.
//!
//! Each route owns an ordered chain of middleware followed by its handler.
//! A middleware receives the request and a [`Next`] continuation; it either
//! calls [`Next::run`] to pass the request on, or returns a response of its
//! own and the rest of the chain never runs.
//!
//! ```text
//! request → mw[0] → mw[1] → … → handler
//!              │        │
//!              └────────┴── any of them may answer early
//! ```
//!
//! Parameter loaders generated by [`Params`](crate::Params) are middleware of
//! this kind. Plain async functions become middleware through [`from_fn`]:
//!
//! ```rust
//! use tsu_params::{middleware, Request, Response};
//! use tsu_params::middleware::Next;
//!
//! let audit = middleware::from_fn(|req: Request, next: Next| async move {
//!     tracing::info!(path = req.path(), "request");
//!     next.run(req).await
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Internal dispatch interface for middleware.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// A type-erased middleware, shared by every request on its route.
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Wraps an `async fn(Request, Next) -> impl IntoResponse` as middleware.
pub fn from_fn<F, Fut, R>(f: F) -> BoxedMiddleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    Arc::new(FnMiddleware(f))
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// The rest of a route's chain, from the current position to the handler.
pub struct Next {
    chain: Arc<[BoxedMiddleware]>,
    index: usize,
    handler: BoxedHandler,
}

impl Next {
    pub(crate) fn new(chain: Arc<[BoxedMiddleware]>, handler: BoxedHandler) -> Self {
        Self { chain, index: 0, handler }
    }

    /// Runs the next middleware, or the handler once the chain is exhausted.
    pub async fn run(self, req: Request) -> Response {
        match self.chain.get(self.index) {
            Some(mw) => {
                let mw = Arc::clone(mw);
                let rest = Self { chain: self.chain, index: self.index + 1, handler: self.handler };
                mw.call(req, rest).await
            }
            None => self.handler.call(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::{Method, StatusCode};
    use parking_lot::Mutex;

    use super::*;
    use crate::handler::Handler;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> BoxedMiddleware {
        let log = Arc::clone(log);
        from_fn(move |req: Request, next: Next| {
            log.lock().push(tag);
            next.run(req)
        })
    }

    #[tokio::test]
    async fn runs_in_registration_order_then_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Arc<[BoxedMiddleware]> =
            vec![recorder(&log, "first"), recorder(&log, "second")].into();

        let tail = Arc::clone(&log);
        let handler = (move |_req: Request| {
            tail.lock().push("handler");
            async { "done" }
        }).into_boxed_handler();

        let res = Next::new(chain, handler).run(Request::new(Method::GET, "/")).await;

        assert_eq!(res.body(), b"done");
        assert_eq!(*log.lock(), ["first", "second", "handler"]);
    }

    #[tokio::test]
    async fn middleware_can_stop_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain: Arc<[BoxedMiddleware]> =
            vec![from_fn(|_req: Request, _next: Next| async { StatusCode::UNAUTHORIZED })].into();

        let counter = Arc::clone(&calls);
        let handler = (move |_req: Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { "unreachable" }
        }).into_boxed_handler();

        let res = Next::new(chain, handler).run(Request::new(Method::GET, "/")).await;

        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
