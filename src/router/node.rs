use crate::ids::NodeId;
use crate::pattern::{expand_template, CompiledRule, CompiledTemplate};
use http::Method;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Maximum number of captured parameters before heap allocation.
/// Most routes carry ≤4 placeholders across domain and path.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` shared with the compiled rule, so collecting a
/// capture is an atomic increment plus the value copy.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Method set of a route. Four inline slots cover `any()`.
pub type MethodSet = SmallVec<[Method; 4]>;

/// Scheme constraint of a route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SchemeRule {
    /// Any scheme passes
    #[default]
    Any,
    /// Lowercased alternation, e.g. `["https"]` or `["http", "https"]`
    OneOf(Vec<String>),
}

impl SchemeRule {
    /// Build from one or more scheme names; `"any"` anywhere yields [`SchemeRule::Any`].
    #[must_use]
    pub fn one_of<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        for scheme in schemes {
            let scheme = scheme.as_ref().trim().to_ascii_lowercase();
            if scheme == "any" {
                return SchemeRule::Any;
            }
            if !scheme.is_empty() && !names.contains(&scheme) {
                names.push(scheme);
            }
        }
        if names.is_empty() {
            SchemeRule::Any
        } else {
            SchemeRule::OneOf(names)
        }
    }

    #[inline]
    #[must_use]
    pub fn allows(&self, scheme: &str) -> bool {
        match self {
            SchemeRule::Any => true,
            SchemeRule::OneOf(names) => names.iter().any(|s| s.eq_ignore_ascii_case(scheme)),
        }
    }
}

impl fmt::Display for SchemeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeRule::Any => f.write_str("any"),
            SchemeRule::OneOf(names) => f.write_str(&names.join("|")),
        }
    }
}

/// Port constraint of a route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PortRule {
    /// Optional and unconstrained
    #[default]
    Any,
    /// A literal port or an alternation of ports
    OneOf(SmallVec<[u16; 4]>),
}

impl PortRule {
    #[must_use]
    pub fn one_of<I: IntoIterator<Item = u16>>(ports: I) -> Self {
        let mut list: SmallVec<[u16; 4]> = SmallVec::new();
        for port in ports {
            if !list.contains(&port) {
                list.push(port);
            }
        }
        if list.is_empty() {
            PortRule::Any
        } else {
            PortRule::OneOf(list)
        }
    }

    /// A request without a known port passes every rule: the constraint is
    /// optional, like the `(:port)?` form hosts are usually written in.
    #[inline]
    #[must_use]
    pub fn allows(&self, port: Option<u16>) -> bool {
        match (self, port) {
            (PortRule::Any, _) | (_, None) => true,
            (PortRule::OneOf(ports), Some(p)) => ports.contains(&p),
        }
    }
}

impl fmt::Display for PortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRule::Any => f.write_str("any"),
            PortRule::OneOf(ports) => {
                let joined: Vec<String> = ports.iter().map(u16::to_string).collect();
                f.write_str(&joined.join("|"))
            }
        }
    }
}

/// One registered route (or the structural root).
#[derive(Debug, Clone)]
pub struct RouteNode {
    pub(crate) id: NodeId,
    pub(crate) parent_id: NodeId,
    pub(crate) methods: MethodSet,
    pub(crate) template: String,
    pub(crate) rule: CompiledRule,
    pub(crate) group_names: Vec<Arc<str>>,
    pub(crate) scheme: SchemeRule,
    /// `None` means any host
    pub(crate) domain: Option<CompiledTemplate>,
    pub(crate) port: PortRule,
    pub(crate) is_leaf: bool,
    pub(crate) name: Option<String>,
}

impl RouteNode {
    /// Fresh, unattached, non-leaf node matching only `/`.
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            parent_id: NodeId::ROOT,
            methods: MethodSet::new(),
            template: "/".to_string(),
            rule: CompiledRule::Literal("/".to_string()),
            group_names: Vec::new(),
            scheme: SchemeRule::Any,
            domain: None,
            port: PortRule::Any,
            is_leaf: false,
            name: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn parent_id(&self) -> NodeId {
        self.parent_id
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Raw URL template with `{name}` placeholders
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn rule(&self) -> &CompiledRule {
        &self.rule
    }

    #[inline]
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.rule.is_literal()
    }

    /// Groups this node belongs to, outermost (`global`) first
    #[must_use]
    pub fn group_names(&self) -> &[Arc<str>] {
        &self.group_names
    }

    #[must_use]
    pub fn scheme(&self) -> &SchemeRule {
        &self.scheme
    }

    /// Domain template, if the route is restricted to certain hosts
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_ref().map(|d| d.template.as_str())
    }

    #[must_use]
    pub fn port(&self) -> &PortRule {
        &self.port
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Generate a URL by substituting `{name}` placeholders.
    ///
    /// With no parameters the raw template is returned; placeholders
    /// without a supplied value are left in the output verbatim.
    #[must_use]
    pub fn url<K, V>(&self, params: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        expand_template(&self.template, params)
    }

    #[inline]
    pub(crate) fn allows_method(&self, method: &Method) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    /// Evaluate all constraints in order: method, scheme, domain, port, path.
    ///
    /// Domain captures are appended to `params` before path captures. When
    /// any check fails `params` is restored to its length on entry.
    pub(crate) fn matches(
        &self,
        method: &Method,
        scheme: &str,
        host: &str,
        port: Option<u16>,
        path: &str,
        params: &mut ParamVec,
    ) -> bool {
        if !self.is_leaf || !self.allows_method(method) || !self.scheme.allows(scheme) {
            return false;
        }

        let mark = params.len();
        if let Some(domain) = &self.domain {
            if !domain.rule.matches_host(host, params) {
                return false;
            }
        }

        if self.port.allows(port) && self.rule.matches(path, params) {
            return true;
        }
        params.truncate(mark);
        false
    }
}

/// Result of successfully matching a request to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub node: &'a RouteNode,
    /// Domain captures followed by path captures
    pub params: ParamVec,
}

impl RouteMatch<'_> {
    /// Get a captured parameter by name
    ///
    /// Uses "last write wins" semantics: a path placeholder shadows a
    /// domain placeholder of the same name.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}
