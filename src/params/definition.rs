//! Parameter definitions and the registry that turns them into middleware.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::error;

use super::loader::ParamLoader;
use super::store::ParamValue;
use crate::error::{BoxError, Error};
use crate::middleware::BoxedMiddleware;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub(crate) type LoadFuture = Pin<Box<dyn Future<Output = Result<ParamValue, BoxError>> + Send + 'static>>;
pub(crate) type LoadFn = dyn Fn(Option<String>, &Request) -> LoadFuture + Send + Sync;
pub(crate) type NotFoundFn = dyn Fn(&Request, Option<&str>) -> Response + Send + Sync;
pub(crate) type LoadErrorFn = dyn Fn(&Request, &BoxError) -> Response + Send + Sync;

/// Receives load failures that no `load_error` hook handled.
pub(crate) type ErrorLog = Arc<dyn Fn(&str, &BoxError) + Send + Sync>;

/// How one route parameter is resolved.
///
/// Every field is optional. The generated middleware consults them in a fixed
/// order: `not_found` on a missing raw value, then `load`, then `load_error`
/// on failure, then `not_found` again on a missing loaded value, then
/// `add_to_boot`, and finally caches the value under `alias`.
///
/// ```rust
/// use http::StatusCode;
/// use tsu_params::Param;
///
/// let id = Param::new()
///     .load(|raw, _req| async move {
///         let raw = raw.unwrap_or_default();
///         raw.parse::<u64>().map(Some)
///     })
///     .not_found(|_req, _raw| StatusCode::NOT_FOUND)
///     .alias("user_id");
/// ```
#[derive(Clone, Default)]
pub struct Param {
    pub(crate) load: Option<Arc<LoadFn>>,
    pub(crate) not_found: Option<Arc<NotFoundFn>>,
    pub(crate) alias: Option<String>,
    pub(crate) add_to_boot: bool,
    pub(crate) load_error: Option<Arc<LoadErrorFn>>,
}

impl Param {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the raw path value into a domain value.
    ///
    /// The loader receives the raw value (`None` when the route has no such
    /// segment) and the request, and returns a `'static` future: copy what
    /// you need out of the request before the `async` block. `Ok(None)` means
    /// "nothing found" and triggers `not_found` when one is set.
    pub fn load<F, Fut, T, E>(mut self, load: F) -> Self
    where
        F: Fn(Option<String>, &Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
        T: Any + Send + Sync,
        E: Into<BoxError>,
    {
        let load: Arc<LoadFn> = Arc::new(move |raw: Option<String>, req: &Request| -> LoadFuture {
            let fut = load(raw, req);
            Box::pin(async move {
                match fut.await {
                    Ok(Some(value)) => Ok(ParamValue::new(value)),
                    Ok(None) => Ok(ParamValue::undefined()),
                    Err(e) => Err(e.into()),
                }
            })
        });
        self.load = Some(load);
        self
    }

    /// Answers the request when the raw or loaded value is missing.
    pub fn not_found<F, R>(mut self, not_found: F) -> Self
    where
        F: Fn(&Request, Option<&str>) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        let not_found: Arc<NotFoundFn> = Arc::new(move |req: &Request, raw: Option<&str>| {
            not_found(req, raw).into_response()
        });
        self.not_found = Some(not_found);
        self
    }

    /// Key the value is cached under. Defaults to the parameter name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Also register the resolved value with the boot registry.
    pub fn add_to_boot(mut self) -> Self {
        self.add_to_boot = true;
        self
    }

    /// Answers the request when `load` fails.
    pub fn load_error<F, R>(mut self, load_error: F) -> Self
    where
        F: Fn(&Request, &BoxError) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        let load_error: Arc<LoadErrorFn> = Arc::new(move |req: &Request, err: &BoxError| {
            load_error(req, err).into_response()
        });
        self.load_error = Some(load_error);
        self
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param")
            .field("load", &self.load.is_some())
            .field("not_found", &self.not_found.is_some())
            .field("alias", &self.alias)
            .field("add_to_boot", &self.add_to_boot)
            .field("load_error", &self.load_error.is_some())
            .finish()
    }
}

/// Parameter name → [`Param`], built once at route-setup time.
///
/// ```rust
/// use http::Method;
/// use tsu_params::{LoadedParams, Param, Params, Request, Response, Router};
///
/// # fn main() -> Result<(), tsu_params::Error> {
/// let params = Params::new()
///     .param("user", Param::new().alias("username"));
///
/// let app = Router::new().on_with(
///     Method::GET,
///     "/users/{user}",
///     [params.loader("user")?],
///     |req: Request| async move {
///         let name = req.loaded_param_as::<String>("username").cloned().unwrap_or_default();
///         Response::text(name)
///     },
/// );
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Params {
    defs: HashMap<String, Arc<Param>>,
    log: ErrorLog,
}

impl Params {
    pub fn new() -> Self {
        Self { defs: HashMap::new(), log: Arc::new(log_load_error) }
    }

    /// Adds (or replaces) the definition for `name`.
    pub fn param(mut self, name: impl Into<String>, param: Param) -> Self {
        self.defs.insert(name.into(), Arc::new(param));
        self
    }

    /// Replaces the hook that receives unhandled load failures. The default
    /// emits a `tracing` error event.
    pub fn log_errors_with<F>(mut self, log: F) -> Self
    where
        F: Fn(&str, &BoxError) + Send + Sync + 'static,
    {
        self.log = Arc::new(log);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.defs.get(name).map(Arc::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// The middleware that resolves `name`.
    ///
    /// Fails with [`Error::UnknownParam`] when `name` has no definition, so a
    /// typo surfaces while routes are being built rather than per request.
    pub fn loader(&self, name: &str) -> Result<BoxedMiddleware, Error> {
        let param = self.defs.get(name)
            .ok_or_else(|| Error::UnknownParam(name.to_owned()))?;
        let mw: BoxedMiddleware =
            Arc::new(ParamLoader::new(name, Arc::clone(param), Arc::clone(&self.log)));
        Ok(mw)
    }

    /// One middleware per defined parameter, keyed by name.
    pub fn middleware(&self) -> HashMap<String, BoxedMiddleware> {
        self.defs.iter()
            .map(|(name, param)| {
                let mw: BoxedMiddleware =
                    Arc::new(ParamLoader::new(name, Arc::clone(param), Arc::clone(&self.log)));
                (name.clone(), mw)
            })
            .collect()
    }
}

impl Default for Params {
    fn default() -> Self { Self::new() }
}

fn log_load_error(param: &str, err: &BoxError) {
    error!(param, error = %err, "param load failed");
}
