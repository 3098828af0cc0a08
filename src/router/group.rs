use super::node::{PortRule, SchemeRule};
use crate::error::PatternCompileError;
use crate::ids::{unique_group_name, GLOBAL_GROUP};
use crate::middleware::MiddlewareRef;
use crate::pattern::{CompiledTemplate, PatternRegistry};
use std::sync::Arc;

/// Options for one [`RouterBuilder::group`](super::RouterBuilder::group) level.
///
/// Every field is optional; unset fields are inherited from the enclosing
/// group.
///
/// ```rust
/// use groveroute::router::GroupOptions;
///
/// let opts = GroupOptions::new()
///     .name("api")
///     .domain("{tenant}.example.com")
///     .schemes(["https"])
///     .port(443);
/// ```
#[derive(Clone, Default)]
pub struct GroupOptions {
    pub(crate) name: Option<String>,
    pub(crate) scheme: Option<SchemeRule>,
    pub(crate) domain: Option<String>,
    pub(crate) port: Option<PortRule>,
    pub(crate) middleware: Vec<MiddlewareRef>,
}

impl GroupOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for the generated group name (a unique suffix is always added).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn scheme(self, scheme: &str) -> Self {
        self.schemes([scheme])
    }

    #[must_use]
    pub fn schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scheme = Some(SchemeRule::one_of(schemes));
        self
    }

    /// Domain template; placeholders are compiled like path placeholders.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn port(self, port: u16) -> Self {
        self.ports([port])
    }

    #[must_use]
    pub fn ports<I: IntoIterator<Item = u16>>(mut self, ports: I) -> Self {
        self.port = Some(PortRule::one_of(ports));
        self
    }

    /// Append middleware shared by every route declared inside the group.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.middleware.push(middleware.into());
        self
    }
}

impl std::fmt::Debug for GroupOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupOptions")
            .field("name", &self.name)
            .field("scheme", &self.scheme)
            .field("domain", &self.domain)
            .field("port", &self.port)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Effective settings of one level of the group stack.
///
/// Routes registered while this level is on top copy its constraints.
#[derive(Debug, Clone)]
pub struct GroupContext {
    /// Unique name of this level
    pub name: Arc<str>,
    /// Names of this level and all enclosing ones, outermost first
    pub names: Vec<Arc<str>>,
    pub scheme: SchemeRule,
    pub domain: Option<CompiledTemplate>,
    pub port: PortRule,
}

impl GroupContext {
    /// Outermost level: no constraints, named `global`.
    #[must_use]
    pub fn global() -> Self {
        let name: Arc<str> = Arc::from(GLOBAL_GROUP);
        Self {
            names: vec![Arc::clone(&name)],
            name,
            scheme: SchemeRule::Any,
            domain: None,
            port: PortRule::Any,
        }
    }

    /// Derive the nested level described by `options`.
    ///
    /// Fields the options leave unset are inherited; the group name always
    /// gets a fresh unique suffix.
    pub fn child(
        &self,
        options: &GroupOptions,
        patterns: &PatternRegistry,
    ) -> Result<Self, PatternCompileError> {
        let domain = match &options.domain {
            Some(template) if !template.is_empty() => Some(patterns.compile_domain(template)?),
            _ => self.domain.clone(),
        };

        let name: Arc<str> = Arc::from(unique_group_name(options.name.as_deref()));
        let mut names = self.names.clone();
        names.push(Arc::clone(&name));

        Ok(Self {
            name,
            names,
            scheme: options.scheme.clone().unwrap_or_else(|| self.scheme.clone()),
            domain,
            port: options.port.clone().unwrap_or_else(|| self.port.clone()),
        })
    }
}
