use super::core::Router;
use super::group::{GroupContext, GroupOptions};
use super::node::MethodSet;
use super::tree::RouteTree;
use crate::dispatcher::{Dispatcher, Handler, HandlerResponse, RequestContext};
use crate::error::RouteRegistrationError;
use crate::ids::NodeId;
use crate::middleware::{MiddlewareRef, MiddlewareTable};
use crate::pattern::PatternRegistry;
use crate::registry::Resolver;
use crate::runtime_config::RouterConfig;
use http::Method;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registration-phase router.
///
/// Owns the pattern registry, the route tree, the middleware table, the
/// handler bindings and the group-option stack. Registration is a single
/// synchronous pass; [`build`](Self::build) freezes the result into an
/// immutable, shareable [`Router`].
///
/// ```rust
/// use groveroute::router::{GroupOptions, RouterBuilder};
/// use groveroute::dispatcher::HandlerResponse;
/// use serde_json::json;
///
/// let mut builder = RouterBuilder::new();
/// builder.pattern("id", r"\d+");
/// builder.get("/users/{id}", |ctx| {
///     Ok(HandlerResponse::json(200, json!({ "id": ctx.param("id") })))
/// })?;
/// builder.group(GroupOptions::new().domain("{tenant}.example.com"), |r| {
///     r.get("/", |ctx| Ok(HandlerResponse::json(200, json!({ "tenant": ctx.param("tenant") }))))?;
///     Ok(())
/// })?;
/// let router = builder.build();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct RouterBuilder {
    config: RouterConfig,
    patterns: PatternRegistry,
    tree: RouteTree,
    middleware: MiddlewareTable,
    dispatcher: Dispatcher,
    names: HashMap<String, NodeId>,
    /// Group stack; index 0 is always the global level
    groups: Vec<GroupContext>,
    resolver: Option<Arc<dyn Resolver>>,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            patterns: PatternRegistry::with_default_fragment(config.default_param_pattern.clone()),
            config,
            tree: RouteTree::new(),
            middleware: MiddlewareTable::new(),
            dispatcher: Dispatcher::new(),
            names: HashMap::new(),
            groups: vec![GroupContext::global()],
            resolver: None,
        }
    }

    /// Register the regex fragment used for `{name}` placeholders.
    ///
    /// Only routes registered afterwards see the fragment.
    pub fn pattern(&mut self, name: &str, fragment: &str) -> &mut Self {
        self.patterns.register(name, fragment);
        self
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    /// Install the resolver for `Named` handlers and middleware.
    pub fn resolver(&mut self, resolver: Arc<dyn Resolver>) -> &mut Self {
        self.resolver = Some(resolver);
        self
    }

    /// Innermost open group level.
    #[must_use]
    pub fn current_group(&self) -> &GroupContext {
        // groups is never empty: the global level is pushed in the constructor
        // and GroupScope only truncates back to a depth >= 1
        &self.groups[self.groups.len() - 1]
    }

    #[must_use]
    pub fn current_group_name(&self) -> &str {
        &self.current_group().name
    }

    /// Add middleware to the current group (global when no group is open).
    pub fn register_middleware(&mut self, middleware: impl Into<MiddlewareRef>) -> &mut Self {
        let name = Arc::clone(&self.current_group().name);
        self.middleware.add_middleware(&name, [middleware.into()]);
        self
    }

    /// Add several middleware to the current group, in order.
    pub fn register_middlewares<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = MiddlewareRef>,
    {
        let name = Arc::clone(&self.current_group().name);
        self.middleware.add_middleware(&name, middleware);
        self
    }

    /// Register `template` for an explicit method set.
    pub fn route(
        &mut self,
        methods: &[Method],
        template: &str,
        handler: Handler,
    ) -> Result<RouteHandle<'_>, RouteRegistrationError> {
        let methods: MethodSet = methods.iter().cloned().collect();
        let ctx = &self.groups[self.groups.len() - 1];
        let id = self.tree.add_route(&self.patterns, methods, template, ctx)?;
        // a re-registered `/` starts without the old binding's middleware
        self.middleware.clear_route_middleware(id);
        self.dispatcher.add_dispatch(id, handler);
        Ok(RouteHandle { builder: self, id })
    }

    pub fn get<F>(&mut self, template: &str, handler: F) -> Result<RouteHandle<'_>, RouteRegistrationError>
    where
        F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        self.route(&[Method::GET], template, Handler::inline(handler))
    }

    pub fn post<F>(&mut self, template: &str, handler: F) -> Result<RouteHandle<'_>, RouteRegistrationError>
    where
        F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        self.route(&[Method::POST], template, Handler::inline(handler))
    }

    pub fn put<F>(&mut self, template: &str, handler: F) -> Result<RouteHandle<'_>, RouteRegistrationError>
    where
        F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        self.route(&[Method::PUT], template, Handler::inline(handler))
    }

    pub fn delete<F>(&mut self, template: &str, handler: F) -> Result<RouteHandle<'_>, RouteRegistrationError>
    where
        F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        self.route(&[Method::DELETE], template, Handler::inline(handler))
    }

    /// GET and POST.
    pub fn any<F>(&mut self, template: &str, handler: F) -> Result<RouteHandle<'_>, RouteRegistrationError>
    where
        F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        self.route(&[Method::GET, Method::POST], template, Handler::inline(handler))
    }

    /// Handler for requests no route accepts.
    pub fn not_found<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        self.not_found_handler(Handler::inline(handler))
    }

    pub fn not_found_handler(&mut self, handler: Handler) -> &mut Self {
        self.dispatcher.add_not_found_dispatch(handler);
        self
    }

    /// Open a nested group for the duration of `closure`.
    ///
    /// The new level inherits every option `options` leaves unset. Routes and
    /// middleware registered inside the closure belong to it. The option
    /// stack is restored on every exit path, including an error or a panic in
    /// the closure; the closure's error is then returned unchanged. Middleware
    /// from `options` is registered once the closure has completed.
    pub fn group<F>(&mut self, options: GroupOptions, closure: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut RouterBuilder) -> anyhow::Result<()>,
    {
        let level = self.current_group().child(&options, &self.patterns)?;
        let name = Arc::clone(&level.name);
        let depth = self.groups.len();

        debug!(
            group = %name,
            depth = depth,
            scheme = %level.scheme,
            domain = level.domain.as_ref().map_or("*", |d| d.template.as_str()),
            port = %level.port,
            "Entering route group"
        );
        self.groups.push(level);

        {
            let mut scope = GroupScope {
                builder: self,
                depth,
            };
            closure(&mut *scope)?;
        }

        if !options.middleware.is_empty() {
            self.middleware.add_middleware(&name, options.middleware);
        }
        Ok(())
    }

    /// Bind a name to a node for [`Router::url`].
    fn name_route(&mut self, id: NodeId, name: &str) {
        if let Some(previous) = self.names.insert(name.to_string(), id) {
            if previous != id {
                warn!(route_name = %name, previous = %previous, node_id = %id, "Route name reassigned");
            }
        }
        if let Some(node) = self.tree.node_mut(id) {
            node.name = Some(name.to_string());
        }
    }

    /// Freeze the registration into an immutable [`Router`].
    #[must_use]
    pub fn build(self) -> Router {
        info!(
            routes_count = self.tree.leaves().count(),
            handlers = self.dispatcher.len(),
            named_routes = self.names.len(),
            patterns = self.patterns.len(),
            not_found_handler = self.dispatcher.has_not_found(),
            "Routing table built"
        );
        if self.groups.len() > 1 {
            warn!(open_groups = self.groups.len() - 1, "Router built with groups still open");
        }
        Router::from_parts(
            self.tree,
            self.middleware,
            self.dispatcher,
            self.names,
            self.resolver,
            self.config,
        )
    }
}

/// Handle to a just-registered route, for naming it or attaching
/// route-specific middleware.
pub struct RouteHandle<'a> {
    builder: &'a mut RouterBuilder,
    id: NodeId,
}

impl RouteHandle<'_> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Name the route for reverse URL generation.
    pub fn name(self, name: &str) -> Self {
        self.builder.name_route(self.id, name);
        self
    }

    /// Middleware run after all group middleware, for this route only.
    pub fn middleware(self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.builder
            .middleware
            .add_route_middleware(self.id, middleware.into());
        self
    }
}

/// Pushed group level; dropping it pops the stack back to `depth`.
struct GroupScope<'a> {
    builder: &'a mut RouterBuilder,
    depth: usize,
}

impl Deref for GroupScope<'_> {
    type Target = RouterBuilder;

    fn deref(&self) -> &RouterBuilder {
        self.builder
    }
}

impl DerefMut for GroupScope<'_> {
    fn deref_mut(&mut self) -> &mut RouterBuilder {
        self.builder
    }
}

impl Drop for GroupScope<'_> {
    fn drop(&mut self) {
        let restored = self.depth.max(1);
        self.builder.groups.truncate(restored);
        debug!(
            depth = restored,
            group = self.builder.current_group_name(),
            "Left route group"
        );
    }
}
