//! Router core module - the frozen routing table and the request hot path.

use super::node::{ParamVec, RouteMatch, RouteNode};
use super::tree::RouteTree;
use crate::dispatcher::{Dispatcher, HandlerResponse, RequestContext};
use crate::ids::NodeId;
use crate::middleware::{ChainOutcome, MiddlewareRef, MiddlewareTable};
use crate::registry::Resolver;
use crate::request::RouteRequest;
use crate::runtime_config::RouterConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Immutable routing table produced by
/// [`RouterBuilder::build`](super::RouterBuilder::build).
///
/// `Router` is `Send + Sync` and is meant to be shared (typically behind an
/// `Arc` or a [`SharedRouter`](crate::hot_reload::SharedRouter)) by every
/// thread serving requests. Nothing on it changes after construction; all
/// per-request state lives in the [`RequestContext`] built by
/// [`dispatch`](Self::dispatch).
pub struct Router {
    tree: RouteTree,
    middleware: MiddlewareTable,
    dispatcher: Dispatcher,
    names: HashMap<String, NodeId>,
    resolver: Option<Arc<dyn Resolver>>,
    config: RouterConfig,
}

impl Router {
    pub(crate) fn from_parts(
        tree: RouteTree,
        middleware: MiddlewareTable,
        dispatcher: Dispatcher,
        names: HashMap<String, NodeId>,
        resolver: Option<Arc<dyn Resolver>>,
        config: RouterConfig,
    ) -> Self {
        Self {
            tree,
            middleware,
            dispatcher,
            names,
            resolver,
            config,
        }
    }

    /// Match a request against the registered routes.
    ///
    /// The port passed to the tree is the request's explicit port, or the
    /// scheme's well-known port when none was supplied. Leaves are tried in
    /// registration order and the first one accepting method, scheme, host,
    /// port and path wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use groveroute::router::RouterBuilder;
    /// use groveroute::request::RouteRequest;
    /// use groveroute::dispatcher::HandlerResponse;
    /// use http::Method;
    ///
    /// let mut builder = RouterBuilder::new();
    /// builder.get("/users/{id}", |_| Ok(HandlerResponse::json(200, serde_json::Value::Null)))?;
    /// let router = builder.build();
    ///
    /// let req = RouteRequest::new(Method::GET, "http", "api.test", "/users/42");
    /// let m = router.lookup(&req).expect("route should match");
    /// assert_eq!(m.get_param("id"), Some("42"));
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn lookup(&self, request: &RouteRequest) -> Option<RouteMatch<'_>> {
        debug!(
            method = %request.method,
            scheme = %request.scheme,
            host = %request.host,
            path = %request.path,
            "Route match attempt"
        );

        let match_start = Instant::now();
        let port = request.effective_port();
        let mut result = self.tree.lookup(
            &request.method,
            &request.scheme,
            &request.host,
            port,
            &request.path,
        );

        if result.is_none() && !self.config.strict_trailing_slash {
            if let Some(trimmed) = trim_trailing_slash(&request.path) {
                result = self.tree.lookup(
                    &request.method,
                    &request.scheme,
                    &request.host,
                    port,
                    trimmed,
                );
            }
        }

        let match_duration = match_start.elapsed();

        let Some(matched) = result else {
            warn!(
                method = %request.method,
                scheme = %request.scheme,
                host = %request.host,
                port = ?port,
                path = %request.path,
                routes_count = self.tree.leaves().count(),
                duration_us = match_duration.as_micros() as u64,
                "No route matched"
            );
            return None;
        };

        if match_duration > self.config.slow_lookup_threshold {
            warn!(
                method = %request.method,
                path = %request.path,
                node_id = %matched.node.id(),
                route_pattern = %matched.node.template(),
                params = ?matched.params,
                duration_us = match_duration.as_micros() as u64,
                "Slow route matching detected"
            );
        } else {
            info!(
                method = %request.method,
                path = %request.path,
                node_id = %matched.node.id(),
                route_pattern = %matched.node.template(),
                params = ?matched.params,
                duration_us = match_duration.as_micros() as u64,
                "Route matched"
            );
        }
        Some(matched)
    }

    /// Route one request to completion.
    ///
    /// 1. [`lookup`](Self::lookup) the request.
    /// 2. Without a match, run the not-found handler (no middleware), or
    ///    fail with [`RouteNotFoundError`](crate::error::RouteNotFoundError).
    /// 3. With a match, run the route's middleware chain left to right; a
    ///    middleware response is returned as-is and the handler never runs.
    /// 4. Otherwise run the bound handler.
    /// 5. Call `after` on the middleware that ran, innermost first.
    ///
    /// Errors from middleware and handlers are returned unchanged.
    pub fn dispatch(&self, request: &RouteRequest) -> anyhow::Result<HandlerResponse> {
        let started = Instant::now();
        let resolver = self.resolver.as_deref();

        let (node, params) = match self.lookup(request) {
            Some(RouteMatch { node, params }) => (Some(node), params),
            None => (None, ParamVec::new()),
        };
        let ctx = RequestContext::new(self, request, node, params);

        let Some(node) = node else {
            return self.dispatcher.execute(&ctx, resolver);
        };

        let chain = self.middleware.resolve_chain(node);
        let mut run = self.middleware.call_middleware(&chain, &ctx, resolver)?;

        let mut response = match run.take_outcome() {
            ChainOutcome::Respond(response) => {
                debug!(
                    request_id = %ctx.request_id,
                    route_pattern = %node.template(),
                    middleware_count = chain.len(),
                    executed = run.executed(),
                    "Middleware short-circuited request"
                );
                response
            }
            ChainOutcome::Continue => self.dispatcher.execute(&ctx, resolver)?,
        };

        run.run_after(&ctx, &mut response, started.elapsed());
        Ok(response)
    }

    /// Generate a URL for the route registered under `name`.
    ///
    /// Returns `None` for an unknown name. See [`RouteNode::url`] for the
    /// substitution rules.
    #[must_use]
    pub fn url<K, V>(&self, name: &str, params: &[(K, V)]) -> Option<String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let id = self.names.get(name)?;
        self.tree.node(*id).map(|node| node.url(params))
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&RouteNode> {
        self.tree.node(id)
    }

    /// Node registered under `name`
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&RouteNode> {
        self.names.get(name).and_then(|id| self.tree.node(*id))
    }

    /// Registered routes in precedence order.
    #[must_use]
    pub fn routes(&self) -> Vec<&RouteNode> {
        self.tree.leaves().collect()
    }

    /// Nodes whose parent is `id`.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<&RouteNode> {
        self.tree.get_children(id)
    }

    #[must_use]
    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    /// Effective middleware chain of the route `id`, outermost first.
    #[must_use]
    pub fn middleware_chain(&self, id: NodeId) -> Vec<&MiddlewareRef> {
        self.tree
            .node(id)
            .map(|node| self.middleware.resolve_chain(node))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Log every registered route at info level.
    pub fn dump_routes(&self) {
        for node in self.tree.leaves() {
            info!(
                node_id = %node.id(),
                methods = ?node.methods(),
                template = %node.template(),
                scheme = %node.scheme(),
                domain = node.domain().unwrap_or("*"),
                port = %node.port(),
                name = node.name().unwrap_or_default(),
                groups = ?node.group_names(),
                "Registered route"
            );
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.tree.leaves().count())
            .field("named_routes", &self.names.len())
            .field("middleware", &self.middleware)
            .field("has_resolver", &self.resolver.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// `Some(path without its trailing slash)` for paths like `/users/`.
fn trim_trailing_slash(path: &str) -> Option<&str> {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => Some(trimmed),
        _ => None,
    }
}
