//! Incoming HTTP request type.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::params::{BootRegistry, LoadedParams, ParamStore, ParamValue};
use crate::response::Responder;

/// An incoming HTTP request and the per-request state the middleware chain
/// builds up around it.
///
/// Besides the wire data, a request owns:
/// - a [`ParamStore`] holding the values loaded by parameter middleware,
///   reachable through the [`LoadedParams`] trait;
/// - a [`Responder`] that records whether a response was already sent;
/// - a handle to the router's [`BootRegistry`].
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    loaded: ParamStore,
    responder: Responder,
    pub(crate) boot: Option<Arc<dyn BootRegistry>>,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    ///
    /// Path parameters are filled in by [`Router::call`](crate::Router::call)
    /// when the path matches a route.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
            params: HashMap::new(),
            loaded: ParamStore::new(),
            responder: Responder::default(),
            boot: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Presets a path parameter. Values captured by the matched route replace
    /// presets of the same name.
    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a raw path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The request's "response already sent" signal. Clone it to answer the
    /// request from inside a loader future.
    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Registers `value` with the boot registry under `alias`.
    pub fn add_to_boot(&self, alias: &str, value: ParamValue) {
        match &self.boot {
            Some(boot) => boot.add_to_boot(alias, value),
            None => debug!(alias, "no boot registry attached, value not registered"),
        }
    }
}

impl LoadedParams for Request {
    fn param_store(&self) -> &ParamStore {
        &self.loaded
    }

    fn param_store_mut(&mut self) -> &mut ParamStore {
        &mut self.loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Boot;

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::GET, "/").with_header("X-Token", "abc");
        assert_eq!(req.header("x-token"), Some("abc"));
        assert_eq!(req.header("x-other"), None);
    }

    #[test]
    fn add_to_boot_reaches_attached_registry() {
        let boot = Arc::new(Boot::default());
        let mut req = Request::new(Method::GET, "/");
        req.add_to_boot("dropped", ParamValue::new(1u8));

        let registry: Arc<dyn BootRegistry> = boot.clone();
        req.boot = Some(registry);
        req.add_to_boot("user", ParamValue::new("alice".to_owned()));

        assert!(!boot.contains("dropped"));
        let user = boot.get("user").and_then(|v| v.downcast::<String>());
        assert_eq!(user.as_deref().map(String::as_str), Some("alice"));
    }
}
