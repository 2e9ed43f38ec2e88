//! The request entry point.
//!
//! A [`Dispatcher`] owns the route forest and the middleware chain, composed once
//! around a routing terminal when it is built. For each request it creates a
//! [`RequestContext`], runs the composed chain, and then flushes the buffered status,
//! headers and body to a [`ResponseWriter`]: the head exactly once, then the body.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use mini_http::handler::Handler;
use mini_http::protocol::{ResponseSlot, ResponseWriter, SendError};
use tracing::debug;

use crate::RequestContext;
use crate::handler::{HandleFn, handler_fn};
use crate::middleware::{Middleware, MiddlewareChain};
use crate::query::{QueryParser, UrlEncodedQueryParser};
use crate::router::PathTree;

const NOT_FOUND_BODY: &str = "404 NotFound";

/// Routes requests through the middleware chain to their handlers.
///
/// Built once by [`DispatcherBuilder`] and then shared read-only across all
/// connections.
pub struct Dispatcher {
    tree: Arc<PathTree>,
    chain: HandleFn,
    query_parser: Arc<dyn QueryParser>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn path_tree(&self) -> &PathTree {
        &self.tree
    }

    /// Handles one request and flushes the buffered response to `writer`.
    pub fn serve<W>(&self, request: Request<Bytes>, writer: &mut W) -> Result<(), SendError>
    where
        W: ResponseWriter + ?Sized,
    {
        let mut ctx = RequestContext::with_query_parser(request, self.query_parser.clone());
        (self.chain)(&mut ctx);

        let (status, headers, body) = ctx.into_response_parts();
        debug!(status = status.as_u16(), body_size = body.len(), "flush response");
        writer.write_head(status, headers)?;
        writer.write_body(body)
    }
}

/// The terminal step: resolves the route and invokes its handler, or answers 404.
fn route(tree: &PathTree, ctx: &mut RequestContext) {
    let Some(node) = tree.find_route(ctx.method(), ctx.path()) else {
        ctx.write_text(StatusCode::NOT_FOUND, NOT_FOUND_BODY);
        return;
    };
    let Some(handler) = node.handler() else {
        ctx.write_text(StatusCode::NOT_FOUND, NOT_FOUND_BODY);
        return;
    };

    ctx.set_matched_route(node.route());
    handler(ctx);
}

#[async_trait]
impl Handler for Dispatcher {
    type Error = SendError;

    async fn call(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Self::Error> {
        let mut slot = ResponseSlot::new();
        self.serve(req, &mut slot)?;
        slot.into_response().ok_or(SendError::MissingHead)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").field("tree", &self.tree).finish_non_exhaustive()
    }
}

/// Collects routes and middleware before serving starts.
pub struct DispatcherBuilder {
    tree: PathTree,
    middlewares: MiddlewareChain,
    query_parser: Arc<dyn QueryParser>,
}

macro_rules! method_route {
    ($method:ident, $method_const:ident) => {
        #[doc = concat!("Registers a `", stringify!($method_const), "` route, see [`DispatcherBuilder::route`].")]
        pub fn $method<F>(self, path: &str, handler: F) -> Self
        where
            F: Fn(&mut RequestContext) + Send + Sync + 'static,
        {
            self.route(Method::$method_const, path, handler)
        }
    };
}

impl DispatcherBuilder {
    fn new() -> Self {
        Self { tree: PathTree::new(), middlewares: MiddlewareChain::new(), query_parser: Arc::new(UrlEncodedQueryParser) }
    }

    /// Registers `handler` for `method` and `path`.
    ///
    /// # Panics
    ///
    /// Panics on a malformed path: empty, without a leading `/`, with a trailing `/`,
    /// or with an empty segment.
    pub fn route<F>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.tree.add_route(method, path, handler_fn(handler));
        self
    }

    method_route!(get, GET);
    method_route!(post, POST);
    method_route!(put, PUT);
    method_route!(delete, DELETE);
    method_route!(head, HEAD);
    method_route!(options, OPTIONS);
    method_route!(patch, PATCH);
    method_route!(trace, TRACE);
    method_route!(connect, CONNECT);

    /// Appends one middleware; the first registered runs outermost.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Appends several middleware in order.
    pub fn middlewares<I>(mut self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.middlewares.extend(middlewares);
        self
    }

    pub fn query_parser(mut self, query_parser: impl QueryParser + 'static) -> Self {
        self.query_parser = Arc::new(query_parser);
        self
    }

    pub fn build(self) -> Dispatcher {
        let tree = Arc::new(self.tree);
        let terminal_tree = tree.clone();
        let terminal: HandleFn = Arc::new(move |ctx: &mut RequestContext| route(&terminal_tree, ctx));
        let chain = self.middlewares.build(terminal);

        Dispatcher { tree, chain, query_parser: self.query_parser }
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("tree", &self.tree)
            .field("middlewares", &self.middlewares)
            .finish_non_exhaustive()
    }
}
