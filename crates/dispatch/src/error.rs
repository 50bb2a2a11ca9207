//! Error types for route compilation, mounting and server startup.
//!
//! Resolution outcomes such as "not found" or "not implemented" are not errors:
//! they travel back as ordinary responses. The types here cover the failures
//! that must stop an application before it serves anything.

use http::Method;
use std::error::Error;
use std::io;
use thiserror::Error;

/// Boxed error returned by request handlers and response bodies.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A rewrite template could not be compiled.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatternError {
    #[error("empty parameter name in template '{template}'")]
    EmptyParameterName { template: String },

    #[error("rest parameter must be the last segment of template '{template}'")]
    RestNotLast { template: String },
}

/// Mounting a controller into an application failed.
#[derive(Error, Debug)]
pub enum MountError {
    #[error("{method} {template} is already bound to {existing}, refusing to rebind it to {incoming}")]
    RouteCollision { template: String, method: Method, existing: String, incoming: String },

    #[error("invalid route: {0}")]
    Pattern(#[from] PatternError),
}

/// The server could not be started.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("unknown server adapter '{0}', expected one of: http1, auto")]
    UnknownAdapter(String),

    #[error("invalid bind address '{0}'")]
    InvalidAddress(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("mount error: {0}")]
    Mount(#[from] MountError),
}
