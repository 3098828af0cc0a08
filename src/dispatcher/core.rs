//! Dispatcher core module - binds handlers to route nodes and runs them.

use crate::error::{ReferenceKind, RouteNotFoundError, UnresolvedReferenceError};
use crate::ids::{NodeId, RequestId};
use crate::registry::Resolver;
use crate::request::RouteRequest;
use crate::router::{ParamVec, RouteNode, Router};
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
///
/// Header names use `Arc<str>` so repeated names (content-type,
/// authorization) are shared; values are per-request `String`s.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response produced by a handler, a middleware or the not-found handler.
///
/// The router never looks inside; it only passes it along.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Everything a middleware or handler sees about the current request.
///
/// Created fresh for every [`Router::dispatch`] call and never stored on
/// the router, so concurrent requests cannot observe each other's
/// parameters.
#[derive(Clone)]
pub struct RequestContext<'a> {
    pub request_id: RequestId,
    pub request: &'a RouteRequest,
    /// Matched node; `None` when the not-found handler runs
    pub node: Option<&'a RouteNode>,
    /// Domain captures followed by path captures
    pub params: ParamVec,
    router: &'a Router,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(
        router: &'a Router,
        request: &'a RouteRequest,
        node: Option<&'a RouteNode>,
        params: ParamVec,
    ) -> Self {
        Self {
            request_id: RequestId::from_header_or_new(request.get_header("x-request-id")),
            request,
            node,
            params,
            router,
        }
    }

    /// Get a captured parameter by name (last write wins)
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn param_or<'b>(&'b self, name: &str, default: &'b str) -> &'b str {
        self.param(name).unwrap_or(default)
    }

    /// Parameters as an owned map. Allocates; prefer [`param`](Self::param).
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[must_use]
    pub fn router(&self) -> &'a Router {
        self.router
    }

    /// Template of the matched route, if any
    #[must_use]
    pub fn route_template(&self) -> Option<&'a str> {
        self.node.map(RouteNode::template)
    }
}

impl std::fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("request", &self.request)
            .field("node", &self.node.map(RouteNode::id))
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// An invokable handler.
///
/// Implemented for every `Fn(&RequestContext) -> anyhow::Result<HandlerResponse>`.
pub trait HandlerFn: Send + Sync {
    fn call(&self, ctx: &RequestContext<'_>) -> anyhow::Result<HandlerResponse>;
}

impl<F> HandlerFn for F
where
    F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync,
{
    fn call(&self, ctx: &RequestContext<'_>) -> anyhow::Result<HandlerResponse> {
        self(ctx)
    }
}

/// A handler binding: an inline callable, or a name that a
/// [`Resolver`] turns into one at dispatch time.
#[derive(Clone)]
pub enum Handler {
    Inline(Arc<dyn HandlerFn>),
    Named(Arc<str>),
}

impl Handler {
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        Handler::Inline(Arc::new(f))
    }

    pub fn named(name: impl AsRef<str>) -> Self {
        Handler::Named(Arc::from(name.as_ref()))
    }

    fn resolve(&self, resolver: Option<&dyn Resolver>) -> anyhow::Result<Arc<dyn HandlerFn>> {
        match self {
            Handler::Inline(f) => Ok(Arc::clone(f)),
            Handler::Named(name) => resolver.and_then(|r| r.handler(name)).ok_or_else(|| {
                UnresolvedReferenceError {
                    kind: ReferenceKind::Handler,
                    name: name.to_string(),
                }
                .into()
            }),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Inline(_) => f.write_str("Handler::Inline(..)"),
            Handler::Named(name) => write!(f, "Handler::Named({name:?})"),
        }
    }
}

impl From<&str> for Handler {
    fn from(name: &str) -> Self {
        Handler::named(name)
    }
}

impl From<String> for Handler {
    fn from(name: String) -> Self {
        Handler::Named(Arc::from(name))
    }
}

impl From<Arc<dyn HandlerFn>> for Handler {
    fn from(f: Arc<dyn HandlerFn>) -> Self {
        Handler::Inline(f)
    }
}

/// Node → handler bindings plus the process-wide not-found fallback.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<NodeId, Handler>,
    not_found: Option<Handler>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `node`. Re-binding replaces the previous handler.
    pub fn add_dispatch(&mut self, node: NodeId, handler: Handler) {
        if self.handlers.insert(node, handler).is_some() {
            warn!(
                node_id = %node,
                total_handlers = self.handlers.len(),
                "Replaced existing handler"
            );
        } else {
            debug!(
                node_id = %node,
                total_handlers = self.handlers.len(),
                "Handler bound"
            );
        }
    }

    /// Set the handler used when no route matches.
    pub fn add_not_found_dispatch(&mut self, handler: Handler) {
        if self.not_found.replace(handler).is_some() {
            warn!("Replaced existing not-found handler");
        }
    }

    #[must_use]
    pub fn handler_for(&self, node: NodeId) -> Option<&Handler> {
        self.handlers.get(&node)
    }

    #[must_use]
    pub fn has_not_found(&self) -> bool {
        self.not_found.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler bound to `ctx.node`.
    ///
    /// Without a node or without a binding the not-found handler runs; if
    /// there is none either, a [`RouteNotFoundError`] is returned. Handler
    /// errors are passed through untouched.
    pub fn execute(
        &self,
        ctx: &RequestContext<'_>,
        resolver: Option<&dyn Resolver>,
    ) -> anyhow::Result<HandlerResponse> {
        let bound = ctx.node.and_then(|node| self.handlers.get(&node.id()));

        let Some(handler) = bound.or(self.not_found.as_ref()) else {
            error!(
                request_id = %ctx.request_id,
                method = %ctx.request.method,
                host = %ctx.request.host,
                path = %ctx.request.path,
                "No route and no not-found handler"
            );
            return Err(RouteNotFoundError {
                method: ctx.request.method.to_string(),
                host: ctx.request.host.clone(),
                path: ctx.request.path.clone(),
            }
            .into());
        };

        if bound.is_none() {
            info!(
                request_id = %ctx.request_id,
                method = %ctx.request.method,
                path = %ctx.request.path,
                "Dispatching to not-found handler"
            );
        } else {
            debug!(
                request_id = %ctx.request_id,
                handler = ?handler,
                route = ctx.route_template().unwrap_or_default(),
                "Dispatching to handler"
            );
        }

        let callable = handler.resolve(resolver)?;
        callable.call(ctx)
    }
}
