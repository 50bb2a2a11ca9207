//! Controller routing and dispatch for micro web applications.
//!
//! Controllers declare actions by name; the name decides the path and the verbs the
//! action answers to. Mounting compiles every controller into one route table, which
//! resolves each request to an action, a rewriter, a 404 or a 501.
//!
//! ```
//! use http::Method;
//! use micro_dispatch::{App, Controller, RequestContext, handler_fn};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let users = Controller::builder("Users")
//!     .action("index", handler_fn(|_req: RequestContext| async { "all users" }))
//!     .action("post_edit", handler_fn(|req: RequestContext| async move { format!("edit {}", req.path_info()) }))
//!     .build();
//!
//! let mut app = App::new();
//! app.mount(users).unwrap();
//!
//! let (parts, ()) = http::Request::builder().method(Method::POST).uri("/users/edit/5").body(()).unwrap().into_parts();
//! let resp = app.call(RequestContext::new(parts, Default::default())).await;
//! assert_eq!(resp.status(), http::StatusCode::OK);
//! # }
//! ```

mod app;
mod body;
mod controller;
mod dispatch;
mod error;
mod handler;
mod registry;
mod request;
mod responder;
mod server;
mod url_map;

pub mod middleware;
pub mod route;

#[cfg(test)]
mod test_support;

pub use app::{App, MountTarget};
pub use body::{OptionReqBody, ReqBody, ResponseBody, req_body};
pub use controller::{Action, Arity, Controller, ControllerBuilder, ControllerGroup, ControllerId};
pub use dispatch::{BoundAction, build_chain, dispatch};
pub use error::{BoxError, MountError, PatternError, ServerError};
pub use handler::{FnHandler, HandlerResult, RequestHandler, handler_fn};
pub use middleware::{Middleware, middleware_fn};
pub use registry::{ControllerRegistry, Selector};
pub use request::{RequestContext, RouteParts};
pub use responder::{Responder, X_CASCADE, not_found, not_implemented, permanent_redirect, redirect, text};
pub use server::{Server, ServerAdapter, ServerConfig, init_logging};
pub use url_map::{UrlMap, UrlMapBinding, UrlMapRoute};
