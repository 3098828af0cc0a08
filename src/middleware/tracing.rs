use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::dispatcher::{HandlerResponse, RequestContext};

/// Emits one structured event per request once the response is known.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, ctx: &RequestContext<'_>) -> anyhow::Result<Option<HandlerResponse>> {
        debug!(
            request_id = %ctx.request_id,
            method = %ctx.request.method,
            host = %ctx.request.host,
            path = %ctx.request.path,
            route = ctx.route_template().unwrap_or_default(),
            "Request entering middleware chain"
        );
        Ok(None)
    }

    fn after(&self, ctx: &RequestContext<'_>, res: &mut HandlerResponse, latency: Duration) {
        info!(
            request_id = %ctx.request_id,
            method = %ctx.request.method,
            path = %ctx.request.path,
            route = ctx.route_template().unwrap_or_default(),
            status = res.status,
            latency_us = latency.as_micros() as u64,
            "Request completed"
        );
    }
}
