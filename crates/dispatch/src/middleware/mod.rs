//! Middleware wraps an action handler in another handler.
//!
//! A controller's middleware is applied in declaration order, the first declared
//! ends up outermost:
//!
//! ```text
//! request -> first -> second -> action -> second -> first -> response
//! ```
//!
//! A middleware may short-circuit by answering without calling the handler it wraps.

mod date;
mod header;
mod trace;

pub use date::{DateHeader, DateService};
pub use header::SetHeader;
pub use trace::RequestTrace;

use crate::handler::RequestHandler;
use std::fmt;

pub trait Middleware: Send + Sync {
    fn wrap(&self, next: Box<dyn RequestHandler>) -> Box<dyn RequestHandler>;
}

#[derive(Clone, Copy)]
pub struct MiddlewareFn<F> {
    f: F,
}

impl<F> fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MiddlewareFn")
    }
}

/// Turns a closure from the next handler to a wrapping handler into a middleware.
pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(Box<dyn RequestHandler>) -> Box<dyn RequestHandler> + Send + Sync,
{
    MiddlewareFn { f }
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(Box<dyn RequestHandler>) -> Box<dyn RequestHandler> + Send + Sync,
{
    fn wrap(&self, next: Box<dyn RequestHandler>) -> Box<dyn RequestHandler> {
        (self.f)(next)
    }
}

/// Wraps `handler` in `middleware`, first element outermost.
pub fn chain<'a, I>(middleware: I, handler: Box<dyn RequestHandler>) -> Box<dyn RequestHandler>
where
    I: IntoIterator<Item = &'a dyn Middleware>,
    I::IntoIter: DoubleEndedIterator,
{
    middleware.into_iter().rev().fold(handler, |next, middleware| middleware.wrap(next))
}
