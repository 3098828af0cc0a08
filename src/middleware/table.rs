use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{Middleware, MiddlewareRef};
use crate::dispatcher::{HandlerResponse, RequestContext};
use crate::ids::NodeId;
use crate::registry::Resolver;
use crate::router::RouteNode;

/// Ordered middleware lists keyed by group name, plus per-route lists.
#[derive(Clone, Default)]
pub struct MiddlewareTable {
    groups: HashMap<Arc<str>, Vec<MiddlewareRef>>,
    routes: HashMap<NodeId, Vec<MiddlewareRef>>,
}

/// What the middleware chain decided.
#[derive(Debug)]
pub enum ChainOutcome {
    /// Every middleware let the request through; the handler runs next
    Continue,
    /// A middleware answered; the handler must not run
    Respond(HandlerResponse),
}

/// Outcome of running a chain, together with the middleware whose
/// `before` hook was executed.
pub struct ChainRun {
    pub outcome: ChainOutcome,
    ran: Vec<Arc<dyn Middleware>>,
}

impl ChainRun {
    /// Number of middleware whose `before` hook ran
    #[must_use]
    pub fn executed(&self) -> usize {
        self.ran.len()
    }

    /// Move the outcome out, leaving [`ChainOutcome::Continue`] behind.
    pub fn take_outcome(&mut self) -> ChainOutcome {
        std::mem::replace(&mut self.outcome, ChainOutcome::Continue)
    }

    /// Call `after` on each executed middleware, innermost first.
    pub fn run_after(&self, ctx: &RequestContext<'_>, res: &mut HandlerResponse, latency: Duration) {
        for mw in self.ran.iter().rev() {
            mw.after(ctx, res, latency);
        }
    }
}

impl MiddlewareTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `middleware` to the list for `group`, creating it on first use.
    pub fn add_middleware<I>(&mut self, group: &str, middleware: I)
    where
        I: IntoIterator<Item = MiddlewareRef>,
    {
        let list = self.groups.entry(Arc::from(group)).or_default();
        let before = list.len();
        list.extend(middleware);
        debug!(
            group = %group,
            added = list.len() - before,
            total = list.len(),
            "Group middleware registered"
        );
    }

    /// Append middleware that applies to a single route only.
    pub fn add_route_middleware(&mut self, node: NodeId, middleware: MiddlewareRef) {
        let list = self.routes.entry(node).or_default();
        list.push(middleware);
        debug!(node_id = %node, total = list.len(), "Route middleware registered");
    }

    /// Drop the route-specific middleware of `node`, when it is re-bound.
    pub fn clear_route_middleware(&mut self, node: NodeId) {
        if let Some(previous) = self.routes.remove(&node) {
            debug!(node_id = %node, dropped = previous.len(), "Route middleware cleared");
        }
    }

    /// Middleware registered for `group`
    #[must_use]
    pub fn group(&self, group: &str) -> &[MiddlewareRef] {
        self.groups.get(group).map_or(&[], Vec::as_slice)
    }

    /// Effective chain for `node`: the lists of every group in
    /// `node.group_names()` (outermost first), then route-specific middleware.
    #[must_use]
    pub fn resolve_chain<'t>(&'t self, node: &RouteNode) -> Vec<&'t MiddlewareRef> {
        node.group_names()
            .iter()
            .filter_map(|name| self.groups.get(name))
            .chain(self.routes.get(&node.id()))
            .flatten()
            .collect()
    }

    /// Run `chain` left to right.
    ///
    /// Stops at the first middleware that returns a response. Named entries
    /// are resolved lazily, so an entry after a short-circuit is never
    /// looked up.
    pub fn call_middleware(
        &self,
        chain: &[&MiddlewareRef],
        ctx: &RequestContext<'_>,
        resolver: Option<&dyn Resolver>,
    ) -> anyhow::Result<ChainRun> {
        let mut ran: Vec<Arc<dyn Middleware>> = Vec::with_capacity(chain.len());

        for (idx, entry) in chain.iter().enumerate() {
            let mw = entry.resolve(resolver)?;
            let result = mw.before(ctx);
            ran.push(mw);

            if let Some(response) = result? {
                debug!(
                    request_id = %ctx.request_id,
                    middleware_idx = idx,
                    middleware = entry.label(),
                    status = response.status,
                    "Middleware returned early response"
                );
                return Ok(ChainRun {
                    outcome: ChainOutcome::Respond(response),
                    ran,
                });
            }
        }

        Ok(ChainRun {
            outcome: ChainOutcome::Continue,
            ran,
        })
    }
}

impl std::fmt::Debug for MiddlewareTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareTable")
            .field("groups", &self.groups)
            .field("routes", &self.routes)
            .finish()
    }
}
