use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::RequestContext;
use crate::handler::HandleFn;
use crate::middleware::Middleware;

type LogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// What the access log records about one request, taken after the chain returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessLog {
    pub host: String,
    pub route: String,
    pub http_method: String,
    pub path: String,
    pub resp_status_code: u16,
}

impl AccessLog {
    fn snapshot(ctx: &RequestContext) -> Self {
        Self {
            host: ctx.host().unwrap_or_default().to_string(),
            route: ctx.matched_route().to_string(),
            http_method: ctx.method().to_string(),
            path: ctx.path().to_string(),
            resp_status_code: ctx.resp_status_code().as_u16(),
        }
    }
}

/// Builds an [`AccessLogMiddleware`] with a pluggable output.
///
/// The default output emits each entry through `tracing` at info level.
pub struct AccessLogBuilder {
    log_fn: LogFn,
}

impl AccessLogBuilder {
    pub fn new() -> Self {
        Self { log_fn: Arc::new(|access_log: &str| info!(access_log, "access")) }
    }

    /// Replaces the output with `log_fn`, which receives each entry as JSON.
    pub fn log_fn(mut self, log_fn: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.log_fn = Arc::new(log_fn);
        self
    }

    pub fn build(self) -> AccessLogMiddleware {
        AccessLogMiddleware { log_fn: self.log_fn }
    }
}

impl Default for AccessLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AccessLogBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessLogBuilder").finish_non_exhaustive()
    }
}

/// Logs host, matched route, method, path and final status of every request.
///
/// The entry is written after the inner steps return, so it sees the status set by
/// the handler, or by whichever inner step short-circuited.
#[derive(Clone)]
pub struct AccessLogMiddleware {
    log_fn: LogFn,
}

impl Middleware for AccessLogMiddleware {
    fn decorate(&self, next: HandleFn) -> HandleFn {
        let log_fn = self.log_fn.clone();
        Arc::new(move |ctx: &mut RequestContext| {
            next(ctx);

            match serde_json::to_string(&AccessLog::snapshot(ctx)) {
                Ok(access_log) => log_fn(&access_log),
                Err(e) => warn!(cause = %e, "can't serialize access log"),
            }
        })
    }
}

impl fmt::Debug for AccessLogMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessLogMiddleware").finish_non_exhaustive()
    }
}
