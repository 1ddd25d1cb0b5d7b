//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Each route is a handler
//! plus the middleware chain that runs in front of it.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::trace;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{BoxedMiddleware, Next};
use crate::params::{Boot, BootRegistry};
use crate::request::Request;
use crate::response::Response;

struct Route {
    chain: Arc<[BoxedMiddleware]>,
    handler: BoxedHandler,
}

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve),
/// or drive it in process with [`Router::call`].
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Arc<Route>>>,
    boot: Arc<dyn BootRegistry>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), boot: Arc::new(Boot::default()) }
    }

    /// Replaces the boot registry handed to every request.
    pub fn boot(mut self, registry: Arc<dyn BootRegistry>) -> Self {
        self.boot = registry;
        self
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with an existing one.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.on_with(method, path, std::iter::empty(), handler)
    }

    /// Register a handler behind a middleware chain. The chain runs in the
    /// order given, before the handler.
    ///
    /// ```rust,no_run
    /// # use http::Method;
    /// # use tsu_params::{Param, Params, Request, Response, Router};
    /// # async fn show_post(_: Request) -> Response { Response::text("") }
    /// # fn main() -> Result<(), tsu_params::Error> {
    /// let params = Params::new()
    ///     .param("user", Param::new())
    ///     .param("post", Param::new());
    ///
    /// Router::new().on_with(
    ///     Method::GET,
    ///     "/users/{user}/posts/{post}",
    ///     [params.loader("user")?, params.loader("post")?],
    ///     show_post,
    /// );
    /// # Ok(()) }
    /// ```
    pub fn on_with(
        mut self,
        method: Method,
        path: &str,
        chain: impl IntoIterator<Item = BoxedMiddleware>,
        handler: impl Handler,
    ) -> Self {
        let route = Route {
            chain: chain.into_iter().collect(),
            handler: handler.into_boxed_handler(),
        };
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(route))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Routes one request through its chain and returns the response.
    ///
    /// A response pushed through the request's [`Responder`](crate::Responder)
    /// takes precedence over whatever the chain returns. Unknown paths get
    /// `404`, known paths under another method get `405`.
    pub async fn call(&self, mut req: Request) -> Response {
        let Some((route, params)) = self.lookup(&req.method, &req.path) else {
            let status = if self.allows_other_method(&req.method, &req.path) {
                StatusCode::METHOD_NOT_ALLOWED
            } else {
                StatusCode::NOT_FOUND
            };
            trace!(method = %req.method, path = %req.path, %status, "no route");
            return Response::status(status);
        };

        req.params.extend(params);
        req.boot = Some(Arc::clone(&self.boot));
        let responder = req.responder().clone();

        let response = Next::new(Arc::clone(&route.chain), Arc::clone(&route.handler))
            .run(req)
            .await;
        responder.take().unwrap_or(response)
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(Arc<Route>, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let route = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((route, params))
    }

    fn allows_other_method(&self, method: &Method, path: &str) -> bool {
        self.routes.iter()
            .any(|(m, tree)| m != method && tree.at(path).is_ok())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(req: Request) -> String {
        req.param("id").unwrap_or("none").to_owned()
    }

    #[tokio::test]
    async fn injects_path_params() {
        let app = Router::new().get("/users/{id}", echo_id);
        let res = app.call(Request::new(Method::GET, "/users/42")).await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"42");
    }

    #[tokio::test]
    async fn unknown_path_and_wrong_method() {
        let app = Router::new().get("/users/{id}", echo_id);

        let missing = app.call(Request::new(Method::GET, "/posts/1")).await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let wrong = app.call(Request::new(Method::POST, "/users/1")).await;
        assert_eq!(wrong.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn sent_response_wins() {
        let app = Router::new().get("/", |req: Request| async move {
            req.responder().send(StatusCode::ACCEPTED);
            "ignored"
        });
        let res = app.call(Request::new(Method::GET, "/")).await;

        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
        assert!(res.body().is_empty());
    }
}
