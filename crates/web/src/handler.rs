//! The handler shape shared by routes, middleware and the composed chain.
//!
//! Handlers are plain synchronous functions over a [`RequestContext`]: every effect
//! goes into the context's buffered response, which the dispatcher flushes once the
//! whole chain has returned.

use std::sync::Arc;

use crate::RequestContext;

/// A route handler, and equally a composed dispatch function.
pub type HandleFn = Arc<dyn Fn(&mut RequestContext) + Send + Sync>;

/// Wraps a closure or fn item into a [`HandleFn`].
pub fn handler_fn<F>(f: F) -> HandleFn
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    Arc::new(f)
}
