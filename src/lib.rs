//! # tsu-params
//!
//! A minimal hyper-based HTTP framework whose routes resolve their path
//! parameters before the handler runs.
//!
//! Describe each route parameter once: how to load it, what to answer when it
//! is missing or fails to load, and under which name to keep it. The
//! [`Params`] registry turns those definitions into route middleware. Per
//! request, each loader reads the raw path segment, resolves it (possibly
//! asynchronously), caches the value on the [`Request`], and passes the
//! request on, or answers it early.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::{Method, StatusCode};
//! use tsu_params::{LoadedParams, Param, Params, Request, Response, Router, Server};
//!
//! #[derive(Debug)]
//! struct User { id: u64, name: String }
//!
//! async fn find_user(id: u64) -> Result<Option<User>, std::io::Error> {
//!     Ok((id == 42).then(|| User { id, name: "alice".into() }))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tsu_params::Error> {
//!     let params = Params::new().param(
//!         "user",
//!         Param::new()
//!             .load(|raw, _req| async move {
//!                 match raw.and_then(|r| r.parse().ok()) {
//!                     Some(id) => find_user(id).await,
//!                     None => Ok(None),
//!                 }
//!             })
//!             .not_found(|_req, _raw| (StatusCode::NOT_FOUND, "no such user")),
//!     );
//!
//!     let app = Router::new()
//!         .on_with(Method::GET, "/users/{user}", [params.loader("user")?], show_user);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn show_user(req: Request) -> Response {
//!     match req.loaded_param_as::<User>("user") {
//!         Some(user) => Response::text(format!("{} #{}", user.name, user.id)),
//!         None => Response::status(StatusCode::NOT_FOUND),
//!     }
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;
pub mod params;

pub use error::{BoxError, Error};
pub use handler::Handler;
pub use params::{Boot, BootRegistry, LoadedParams, Param, ParamStore, ParamValue, Params};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Responder, Response};
pub use router::Router;
pub use server::Server;
