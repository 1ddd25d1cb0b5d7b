//! The middleware generated for each route parameter.
//!
//! One invocation walks this state machine and ends in exactly one terminal
//! state:
//!
//! ```text
//! Start → RawExtracted ─┬─ raw missing + not_found ─────────────→ Stopped(NotFound)
//!                       └─ Resolving ─┬─ response already sent ─→ Stopped(silently)
//!                                     ├─ Resolved ─┐
//!                                     └─ Failed ───┼─ load_error ─→ Stopped(LoadError)
//!                                                  │  (else logged, value undefined)
//!                                                  ├─ value missing + not_found → Stopped(NotFound)
//!                                                  └─ Stored → Continued
//! ```
//!
//! There are no retries. A failed load ends resolution for that request.

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, trace};

use super::definition::{ErrorLog, Param};
use super::store::{LoadedParams, ParamValue};
use crate::handler::BoxFuture;
use crate::middleware::{ErasedMiddleware, Next};
use crate::request::Request;
use crate::response::Response;

pub(crate) struct ParamLoader {
    name: Arc<str>,
    param: Arc<Param>,
    log: ErrorLog,
}

impl ParamLoader {
    pub(crate) fn new(name: &str, param: Arc<Param>, log: ErrorLog) -> Self {
        Self { name: Arc::from(name), param, log }
    }
}

impl ErasedMiddleware for ParamLoader {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let name = Arc::clone(&self.name);
        let param = Arc::clone(&self.param);
        let log = Arc::clone(&self.log);
        Box::pin(async move { resolve(&name, &param, &log, req, next).await })
    }
}

async fn resolve(name: &str, param: &Param, log: &ErrorLog, mut req: Request, next: Next) -> Response {
    let raw = req.param(name).map(str::to_owned);

    if let Some(not_found) = &param.not_found {
        if raw.as_deref().is_none_or(str::is_empty) {
            debug!(param = name, "raw value missing");
            return not_found(&req, raw.as_deref());
        }
    }

    let resolved = match &param.load {
        Some(load) => {
            let pending = load(raw.clone(), &req);
            pending.await
        }
        None => Ok(raw.clone().map_or_else(ParamValue::undefined, ParamValue::new)),
    };

    let value = match resolved {
        Ok(value) => {
            if req.responder().is_sent() {
                trace!(param = name, "response sent while loading, stopping");
                return req.responder().take()
                    .unwrap_or_else(|| Response::status(StatusCode::NO_CONTENT));
            }
            value
        }
        Err(err) => {
            if let Some(load_error) = &param.load_error {
                debug!(param = name, error = %err, "load failed, handing off to load_error");
                return load_error(&req, &err);
            }
            log(name, &err);
            ParamValue::undefined()
        }
    };

    if let Some(not_found) = &param.not_found {
        if value.is_falsy() {
            debug!(param = name, "loaded value missing");
            return not_found(&req, raw.as_deref());
        }
    }

    let alias = param.alias.as_deref().unwrap_or(name);
    if param.add_to_boot {
        req.add_to_boot(alias, value.clone());
    }
    req.add_loaded_param(alias, value);

    next.run(req).await
}
