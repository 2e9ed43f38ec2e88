//! Onion-style middleware composition.
//!
//! A [`Middleware`] decorates the next dispatch function and returns a new one. It
//! may run code before and after calling `next`, or not call it at all, which skips
//! every step inside it together with the route handler.
//!
//! [`MiddlewareChain::build`] folds the steps from last to first around a terminal
//! function, so for steps `[A, B]` the execution order is
//! `A-pre, B-pre, terminal, B-post, A-post`.
//!
//! # Example
//!
//! ```
//! use mini_web::middleware::MiddlewareChain;
//! use mini_web::{HandleFn, RequestContext, handler_fn};
//! use std::sync::Arc;
//!
//! let mut chain = MiddlewareChain::new();
//! chain.push(|next: HandleFn| -> HandleFn {
//!     Arc::new(move |ctx: &mut RequestContext| {
//!         next(ctx);
//!         ctx.resp_headers_mut().insert("x-powered-by", "mini-web".parse().unwrap());
//!     })
//! });
//!
//! let dispatch = chain.build(handler_fn(|ctx| ctx.set_body("hello")));
//! ```

mod access_log;

pub use access_log::AccessLog;
pub use access_log::AccessLogBuilder;
pub use access_log::AccessLogMiddleware;

use std::fmt;
use std::sync::Arc;

use crate::handler::HandleFn;

/// One step of the middleware chain.
pub trait Middleware: Send + Sync {
    fn decorate(&self, next: HandleFn) -> HandleFn;
}

impl<F> Middleware for F
where
    F: Fn(HandleFn) -> HandleFn + Send + Sync,
{
    fn decorate(&self, next: HandleFn) -> HandleFn {
        (self)(next)
    }
}

/// The ordered middleware steps, outermost first.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    steps: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: impl Middleware + 'static) {
        self.steps.push(Arc::new(middleware));
    }

    pub fn extend<I>(&mut self, middlewares: I)
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.steps.extend(middlewares);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Composes every step around `terminal` into one dispatch function.
    pub fn build(&self, terminal: HandleFn) -> HandleFn {
        self.steps.iter().rev().fold(terminal, |next, middleware| middleware.decorate(next))
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain").field("steps", &self.steps.len()).finish()
    }
}
