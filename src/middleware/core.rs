use std::sync::Arc;
use std::time::Duration;

use crate::dispatcher::{HandlerResponse, RequestContext};
use crate::error::{ReferenceKind, UnresolvedReferenceError};
use crate::registry::Resolver;

/// Cross-cutting step run before the handler of a matched route.
///
/// `before` returning `Ok(Some(response))` short-circuits: later middleware
/// and the handler never run and `response` is returned. `Ok(None)` lets the
/// request continue. An `Err` aborts the dispatch and reaches the caller
/// unchanged.
pub trait Middleware: Send + Sync {
    fn before(&self, _ctx: &RequestContext<'_>) -> anyhow::Result<Option<HandlerResponse>> {
        Ok(None)
    }

    /// Runs in reverse order for every middleware whose `before` ran,
    /// including one that short-circuited.
    fn after(&self, _ctx: &RequestContext<'_>, _res: &mut HandlerResponse, _latency: Duration) {}
}

/// Middleware built from a closure, see [`from_fn`].
pub struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&RequestContext<'_>) -> anyhow::Result<Option<HandlerResponse>> + Send + Sync,
{
    fn before(&self, ctx: &RequestContext<'_>) -> anyhow::Result<Option<HandlerResponse>> {
        (self.0)(ctx)
    }
}

/// Wrap a `before`-only closure as middleware.
///
/// ```rust
/// use groveroute::middleware::from_fn;
/// use groveroute::dispatcher::HandlerResponse;
///
/// let deny_all = from_fn(|_ctx| Ok(Some(HandlerResponse::error(403, "Forbidden"))));
/// # let _ = deny_all;
/// ```
pub fn from_fn<F>(f: F) -> MiddlewareRef
where
    F: Fn(&RequestContext<'_>) -> anyhow::Result<Option<HandlerResponse>> + Send + Sync + 'static,
{
    MiddlewareRef::Inline(Arc::new(FnMiddleware(f)))
}

/// A middleware entry: an inline instance or a name resolved at dispatch
/// time through a [`Resolver`].
#[derive(Clone)]
pub enum MiddlewareRef {
    Inline(Arc<dyn Middleware>),
    Named(Arc<str>),
}

impl MiddlewareRef {
    pub fn named(name: impl AsRef<str>) -> Self {
        MiddlewareRef::Named(Arc::from(name.as_ref()))
    }

    pub(crate) fn resolve(
        &self,
        resolver: Option<&dyn Resolver>,
    ) -> anyhow::Result<Arc<dyn Middleware>> {
        match self {
            MiddlewareRef::Inline(mw) => Ok(Arc::clone(mw)),
            MiddlewareRef::Named(name) => resolver.and_then(|r| r.middleware(name)).ok_or_else(|| {
                UnresolvedReferenceError {
                    kind: ReferenceKind::Middleware,
                    name: name.to_string(),
                }
                .into()
            }),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            MiddlewareRef::Inline(_) => "inline",
            MiddlewareRef::Named(name) => name.as_ref(),
        }
    }
}

impl std::fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareRef::Inline(_) => f.write_str("MiddlewareRef::Inline(..)"),
            MiddlewareRef::Named(name) => write!(f, "MiddlewareRef::Named({name:?})"),
        }
    }
}

impl<M: Middleware + 'static> From<Arc<M>> for MiddlewareRef {
    fn from(mw: Arc<M>) -> Self {
        MiddlewareRef::Inline(mw)
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self {
        MiddlewareRef::named(name)
    }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self {
        MiddlewareRef::Named(Arc::from(name))
    }
}
