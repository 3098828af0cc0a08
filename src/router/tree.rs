use super::group::GroupContext;
use super::node::{MethodSet, ParamVec, RouteMatch, RouteNode};
use crate::error::RouteRegistrationError;
use crate::ids::NodeId;
use crate::pattern::PatternRegistry;
use http::Method;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Store of every registered route.
///
/// Nodes live in a vector indexed by [`NodeId`]; a `parent → children`
/// index records the hierarchy for introspection and URL bookkeeping.
/// Matching does not descend the hierarchy: it scans leaves in
/// registration order and the first full match wins, because domain,
/// scheme and port constraints only make sense evaluated on a whole route.
#[derive(Debug, Clone)]
pub struct RouteTree {
    nodes: Vec<RouteNode>,
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Leaf ids in registration (= precedence) order
    leaves: Vec<NodeId>,
    /// Node count at which `new_node` refuses to allocate
    max_nodes: usize,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    /// Tree holding only the structural root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_node_limit(u32::MAX as usize)
    }

    /// Tree that holds at most `max_nodes` nodes, the root included.
    pub(crate) fn with_node_limit(max_nodes: usize) -> Self {
        Self {
            nodes: vec![RouteNode::new(NodeId::ROOT)],
            children: HashMap::new(),
            leaves: Vec::new(),
            max_nodes: max_nodes.min(u32::MAX as usize),
        }
    }

    /// Allocate a node with the next sequential id. It is not attached to
    /// any parent yet.
    ///
    /// Fails once the id space is used up rather than handing out an id
    /// twice.
    pub fn new_node(&mut self) -> Result<NodeId, RouteRegistrationError> {
        let limit = RouteRegistrationError::NodeLimit {
            limit: self.max_nodes,
        };
        if self.nodes.len() >= self.max_nodes {
            return Err(limit);
        }
        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| limit)?);
        self.nodes.push(RouteNode::new(id));
        Ok(id)
    }

    #[must_use]
    pub fn root(&self) -> &RouteNode {
        &self.nodes[NodeId::ROOT.index()]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&RouteNode> {
        self.nodes.get(id.index())
    }

    /// Number of nodes including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing besides the structural root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Leaf nodes in precedence order.
    pub fn leaves(&self) -> impl Iterator<Item = &RouteNode> + '_ {
        self.leaves.iter().filter_map(|id| self.node(*id))
    }

    /// Nodes whose parent is `id`, in registration order.
    #[must_use]
    pub fn get_children(&self, id: NodeId) -> Vec<&RouteNode> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.node(*c)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut RouteNode> {
        self.nodes.get_mut(id.index())
    }

    /// Register a route.
    ///
    /// `/` always maps onto the singleton root node. Any other template gets a
    /// new node attached under the root. The node takes its scheme, domain,
    /// port and group names from `ctx` and is marked leaf.
    pub fn add_route(
        &mut self,
        patterns: &PatternRegistry,
        methods: MethodSet,
        template: &str,
        ctx: &GroupContext,
    ) -> Result<NodeId, RouteRegistrationError> {
        let compiled = patterns.compile(template)?;

        let id = if template == "/" {
            if self.root().is_leaf {
                warn!(
                    group = %ctx.name,
                    "Root route registered again - previous root binding replaced"
                );
            }
            NodeId::ROOT
        } else {
            let id = self.new_node()?;
            self.attach(id, NodeId::ROOT);
            id
        };

        let Some(node) = self.node_mut(id) else {
            // ids come from new_node, the slot always exists
            return Ok(id);
        };
        node.methods = methods;
        node.template = compiled.template;
        node.rule = compiled.rule;
        node.group_names = ctx.names.clone();
        node.scheme = ctx.scheme.clone();
        node.domain = ctx.domain.clone();
        node.port = ctx.port.clone();
        let was_leaf = std::mem::replace(&mut node.is_leaf, true);

        info!(
            node_id = %id,
            methods = ?node.methods,
            template = %node.template,
            literal = node.rule.is_literal(),
            scheme = %node.scheme,
            domain = node.domain().unwrap_or("*"),
            port = %node.port,
            group = %ctx.name,
            "Route registered"
        );

        if !was_leaf {
            self.leaves.push(id);
        }
        Ok(id)
    }

    fn attach(&mut self, child: NodeId, parent: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.parent_id = parent;
        }
        self.children.entry(parent).or_default().push(child);
    }

    /// Find the first leaf, in registration order, that accepts the request.
    ///
    /// A path that matches a route whose method set excludes `method` is
    /// reported exactly like no match at all.
    #[must_use]
    pub fn lookup(
        &self,
        method: &Method,
        scheme: &str,
        host: &str,
        port: Option<u16>,
        path: &str,
    ) -> Option<RouteMatch<'_>> {
        let mut params = ParamVec::new();
        for node in self.leaves() {
            if node.matches(method, scheme, host, port, path, &mut params) {
                return Some(RouteMatch { node, params });
            }
        }

        debug!(
            method = %method,
            scheme = %scheme,
            host = %host,
            path = %path,
            candidates = self.leaves.len(),
            "No leaf accepted request"
        );
        None
    }
}
