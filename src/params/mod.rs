//! Request-scoped route parameter loading.
//!
//! Describe each route parameter once with a [`Param`], collect them in a
//! [`Params`] registry, and wire the generated middleware into the routes
//! that carry the parameter. Per request, the middleware reads the raw path
//! value, optionally loads it, and caches the result in the request's
//! [`ParamStore`] for downstream handlers to read through [`LoadedParams`].

mod boot;
mod definition;
mod loader;
mod store;

pub use boot::{Boot, BootRegistry};
pub use definition::{Param, Params};
pub use store::{Aliases, LoadedParams, ParamStore, ParamValue};
